//! Batched parcel retrieval from the cadastral map services.

use futures::future::join_all;
use hashbrown::HashSet;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::response::FeatureCollection;
use super::{Endpoints, Jurisdiction};
use crate::error::FetchError;
use crate::models::{FetchResult, ParcelRecord};

/// Identifiers fetched concurrently per group. The next group starts only
/// after every request in the current one has settled.
pub const GROUP_SIZE: usize = 5;

const USER_AGENT: &str = concat!("parcelkit/", env!("CARGO_PKG_VERSION"));

/// Resolves lot/plan identifiers against the QLD and NSW cadastre.
///
/// Each `fetch_all` call owns its own accumulator; concurrent calls on the
/// same fetcher are independent and not synchronized with each other.
#[derive(Debug, Clone)]
pub struct ParcelFetcher {
    client: Client,
    endpoints: Endpoints,
}

impl ParcelFetcher {
    pub fn new(endpoints: Endpoints) -> reqwest::Result<Self> {
        Self::with_user_agent(endpoints, USER_AGENT)
    }

    pub fn with_user_agent(endpoints: Endpoints, user_agent: &str) -> reqwest::Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self::with_client(client, endpoints))
    }

    pub fn with_client(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Fetch every identifier, never failing as a whole.
    ///
    /// Identifiers are trimmed, blanks dropped and duplicates collapsed to
    /// their first occurrence. Every remaining identifier ends up in exactly
    /// one of `present` or `missing`.
    pub async fn fetch_all<S: AsRef<str>>(&self, identifiers: &[S]) -> FetchResult {
        self.fetch_all_with_progress(identifiers, |_, _| {}).await
    }

    /// Like [`fetch_all`](Self::fetch_all), calling `on_group(settled, total)`
    /// after each group completes.
    pub async fn fetch_all_with_progress<S, F>(&self, identifiers: &[S], mut on_group: F) -> FetchResult
    where
        S: AsRef<str>,
        F: FnMut(usize, usize),
    {
        let ids = distinct_identifiers(identifiers);
        let total = ids.len();
        let mut result = FetchResult::default();

        info!(
            "Fetching {} parcels in {} groups of up to {}",
            total,
            total.div_ceil(GROUP_SIZE),
            GROUP_SIZE
        );

        let mut settled = 0;
        for (group_index, group) in ids.chunks(GROUP_SIZE).enumerate() {
            debug!("Group {}: {:?}", group_index + 1, group);

            let outcomes = join_all(group.iter().map(|id| async move {
                let outcome = self.fetch_one(id).await;
                (id, outcome)
            }))
            .await;

            for (id, outcome) in outcomes {
                match outcome {
                    Ok(record) => {
                        result.present.insert(id.clone(), record);
                    }
                    Err(e) => {
                        warn!("Parcel {} unresolved: {}", id, e);
                        result.missing.push(id.clone());
                    }
                }
            }

            settled += group.len();
            on_group(settled, total);
        }

        info!(
            "Resolved {}/{} parcels ({} missing)",
            result.present.len(),
            total,
            result.missing.len()
        );

        result
    }

    /// Fetch a single identifier from the service its format points to.
    pub async fn fetch_one(&self, identifier: &str) -> Result<ParcelRecord, FetchError> {
        let jurisdiction = Jurisdiction::classify(identifier);
        let url = self.endpoints.query_url(jurisdiction, identifier);
        debug!("Querying {} for {}: {}", jurisdiction, identifier, url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        FeatureCollection::from_slice(&body)?.into_first_parcel(identifier)
    }
}

fn distinct_identifiers<S: AsRef<str>>(identifiers: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    identifiers
        .iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    const QLD_PATH: &str = "/qld/MapServer/4/query";
    const NSW_PATH: &str = "/nsw/MapServer/9/query";

    fn fetcher(server: &MockServer) -> ParcelFetcher {
        let endpoints = Endpoints::new(
            &format!("{}{}", server.uri(), QLD_PATH),
            &format!("{}{}", server.uri(), NSW_PATH),
        )
        .unwrap();
        ParcelFetcher::new(endpoints).unwrap()
    }

    fn square(id: &str, lng: f64, lat: f64) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [lng, lat], [lng + 0.001, lat], [lng + 0.001, lat + 0.001],
                        [lng, lat + 0.001], [lng, lat]
                    ]]
                },
                "properties": {"lotplan": id, "lottype": "Lot"}
            }]
        })
    }

    async fn mount_parcel(server: &MockServer, field_path: &str, where_clause: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(field_path))
            .and(query_param("where", where_clause))
            .and(query_param("outFields", "*"))
            .and(query_param("returnGeometry", "true"))
            .and(query_param("f", "geojson"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_distinct_identifiers() {
        let ids = distinct_identifiers(&["3RP1", " 3RP1 ", "", "  ", "1//DP2", "3RP1"]);
        assert_eq!(ids, vec!["3RP1", "1//DP2"]);
    }

    #[tokio::test]
    async fn test_routes_by_jurisdiction() {
        let server = MockServer::start().await;
        mount_parcel(&server, QLD_PATH, "lotplan='3RP12345'", square("3RP12345", 153.0, -27.5)).await;
        mount_parcel(
            &server,
            NSW_PATH,
            "lotidstring='1//DP123456'",
            square("1//DP123456", 151.2, -33.8),
        )
        .await;

        let result = fetcher(&server).fetch_all(&["3RP12345", "1//DP123456"]).await;

        assert!(result.missing.is_empty());
        assert_eq!(
            result.present.identifiers().collect::<Vec<_>>(),
            vec!["3RP12345", "1//DP123456"]
        );
        let qld = result.present.get("3RP12345").unwrap();
        assert_eq!(qld.lot_type(), "Lot");
        assert!(qld.area_hectares > 0.0);
    }

    #[tokio::test]
    async fn test_failures_become_missing() {
        let server = MockServer::start().await;
        mount_parcel(&server, QLD_PATH, "lotplan='1RP1'", square("1RP1", 153.0, -27.0)).await;
        mount_parcel(
            &server,
            QLD_PATH,
            "lotplan='2RP2'",
            json!({"type": "FeatureCollection", "features": []}),
        )
        .await;
        Mock::given(method("GET"))
            .and(path(QLD_PATH))
            .and(query_param("where", "lotplan='3RP3'"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(QLD_PATH))
            .and(query_param("where", "lotplan='4RP4'"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let ids = ["1RP1", "2RP2", "3RP3", "4RP4"];
        let result = fetcher(&server).fetch_all(&ids).await;

        assert_eq!(result.present.identifiers().collect::<Vec<_>>(), vec!["1RP1"]);
        assert_eq!(result.missing, vec!["2RP2", "3RP3", "4RP4"]);
    }

    #[tokio::test]
    async fn test_transport_error_is_contained() {
        // Nothing listens on the discard port
        let endpoints = Endpoints::new("http://127.0.0.1:9/query", "http://127.0.0.1:9/query").unwrap();
        let fetcher = ParcelFetcher::new(endpoints).unwrap();

        assert!(matches!(
            fetcher.fetch_one("3RP1").await,
            Err(FetchError::Transport(_))
        ));
        let result = fetcher.fetch_all(&["3RP1", "1//DP1"]).await;
        assert!(result.present.is_empty());
        assert_eq!(result.missing, vec!["3RP1", "1//DP1"]);
    }

    #[tokio::test]
    async fn test_partition_is_exhaustive_across_groups() {
        let server = MockServer::start().await;
        let ids: Vec<String> = (1..=12).map(|i| format!("{i}RP{i}")).collect();
        for (i, id) in ids.iter().enumerate() {
            if i % 3 != 0 {
                mount_parcel(
                    &server,
                    QLD_PATH,
                    &format!("lotplan='{id}'"),
                    square(id, 153.0 + i as f64 * 0.01, -27.0),
                )
                .await;
            }
        }
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"type": "FeatureCollection", "features": []})),
            )
            .with_priority(10)
            .mount(&server)
            .await;

        let mut groups = Vec::new();
        let result = fetcher(&server)
            .fetch_all_with_progress(&ids, |settled, total| groups.push((settled, total)))
            .await;

        assert_eq!(result.present.len() + result.missing.len(), ids.len());
        for id in &result.missing {
            assert!(!result.present.contains(id));
        }
        assert_eq!(result.missing, vec!["1RP1", "4RP4", "7RP7", "10RP10"]);
        assert_eq!(groups, vec![(5, 12), (10, 12), (12, 12)]);
    }

    #[tokio::test]
    async fn test_duplicates_resolve_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QLD_PATH))
            .and(query_param("where", "lotplan='5SP55'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(square("5SP55", 150.0, -30.0)))
            .expect(1)
            .mount(&server)
            .await;

        let result = fetcher(&server).fetch_all(&["5SP55", "5SP55", " 5SP55"]).await;
        assert_eq!(result.present.len(), 1);
        assert!(result.missing.is_empty());
    }

    /// Logs when each request reaches the server, keyed by its `where` clause.
    #[derive(Clone, Default)]
    struct ArrivalLog(Arc<Mutex<Vec<(String, Instant)>>>);

    impl ArrivalLog {
        fn arrival(&self, where_clause: &str) -> Instant {
            let log = self.0.lock().unwrap();
            log.iter()
                .find(|(clause, _)| clause == where_clause)
                .map(|(_, at)| *at)
                .unwrap()
        }
    }

    struct RecordArrival {
        log: ArrivalLog,
        template: ResponseTemplate,
    }

    impl Respond for RecordArrival {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let where_clause = request
                .url
                .query_pairs()
                .find(|(k, _)| k == "where")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            self.log.0.lock().unwrap().push((where_clause, Instant::now()));
            self.template.clone()
        }
    }

    #[tokio::test]
    async fn test_group_settles_before_next_starts() {
        let server = MockServer::start().await;
        let log = ArrivalLog::default();
        let delay = Duration::from_millis(400);

        for i in 1..=6 {
            // Only the first group is slow to answer
            let mut template = ResponseTemplate::new(200).set_body_json(square("x", 153.0, -27.0));
            if i <= GROUP_SIZE {
                template = template.set_delay(delay);
            }
            Mock::given(method("GET"))
                .and(query_param("where", format!("lotplan='{i}RP{i}'")))
                .respond_with(RecordArrival {
                    log: log.clone(),
                    template,
                })
                .mount(&server)
                .await;
        }

        let ids: Vec<String> = (1..=6).map(|i| format!("{i}RP{i}")).collect();
        let result = fetcher(&server).fetch_all(&ids).await;
        assert_eq!(result.present.len(), 6);
        assert_eq!(log.0.lock().unwrap().len(), 6);

        let first_group: Vec<Instant> = (1..=GROUP_SIZE)
            .map(|i| log.arrival(&format!("lotplan='{i}RP{i}'")))
            .collect();
        let earliest = *first_group.iter().min().unwrap();
        let latest = *first_group.iter().max().unwrap();
        let sixth = log.arrival("lotplan='6RP6'");

        // The first group is in flight together
        assert!(latest - earliest < delay / 2, "first group was not concurrent");
        // The sixth request waits for every delayed response in the first group
        assert!(sixth >= latest, "sixth request overtook the first group");
        assert!(
            sixth - latest >= delay - Duration::from_millis(50),
            "sixth request started before the first group settled"
        );
    }
}
