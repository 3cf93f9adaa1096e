//! Upstream ArcGIS query endpoints.

use url::Url;

use super::Jurisdiction;
use crate::error::ConfigError;

pub const QLD_QUERY_URL: &str = "https://spatial-gis.information.qld.gov.au/arcgis/rest/services/PlanningCadastre/LandParcelPropertyFramework/MapServer/4/query";
pub const NSW_QUERY_URL: &str =
    "https://maps.six.nsw.gov.au/arcgis/rest/services/public/NSW_Cadastre/MapServer/9/query";

/// Validated query URLs, one per jurisdiction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    queensland: Url,
    new_south_wales: Url,
}

impl Endpoints {
    pub fn new(queensland: &str, new_south_wales: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            queensland: parse_endpoint(queensland)?,
            new_south_wales: parse_endpoint(new_south_wales)?,
        })
    }

    pub fn url_for(&self, jurisdiction: Jurisdiction) -> &Url {
        match jurisdiction {
            Jurisdiction::Queensland => &self.queensland,
            Jurisdiction::NewSouthWales => &self.new_south_wales,
        }
    }

    /// Exact-match query for one identifier: all fields, full geometry, GeoJSON.
    pub fn query_url(&self, jurisdiction: Jurisdiction, identifier: &str) -> Url {
        let mut url = self.url_for(jurisdiction).clone();
        url.query_pairs_mut()
            .append_pair("where", &jurisdiction.where_clause(identifier))
            .append_pair("outFields", "*")
            .append_pair("returnGeometry", "true")
            .append_pair("f", "geojson");
        url
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_endpoints_parse() {
        let endpoints = Endpoints::new(QLD_QUERY_URL, NSW_QUERY_URL).unwrap();
        assert_eq!(
            endpoints.url_for(Jurisdiction::Queensland).host_str(),
            Some("spatial-gis.information.qld.gov.au")
        );
        assert_eq!(
            endpoints.url_for(Jurisdiction::NewSouthWales).host_str(),
            Some("maps.six.nsw.gov.au")
        );
    }

    #[test]
    fn test_query_url_params() {
        let endpoints = Endpoints::new(QLD_QUERY_URL, NSW_QUERY_URL).unwrap();
        let url = endpoints.query_url(Jurisdiction::NewSouthWales, "1//DP123456");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("where".to_string(), "lotidstring='1//DP123456'".to_string()),
                ("outFields".to_string(), "*".to_string()),
                ("returnGeometry".to_string(), "true".to_string()),
                ("f".to_string(), "geojson".to_string()),
            ]
        );
        assert!(url.path().ends_with("/MapServer/9/query"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = Endpoints::new("not a url", NSW_QUERY_URL).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }
}
