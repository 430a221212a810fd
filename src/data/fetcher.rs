use std::fs;

use log::debug;

use crate::data::feature_collection::FeatureCollection;
use crate::errors::error_types::{
    ErrorTypes, BODY_READ_FAILED, CLIENT_BUILD_FAILED, HTTP_STATUS, TRANSPORT_FAILED,
};

/// Raw answer to a dataset request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Something that can GET a dataset by location.
pub trait Fetcher: Send + Sync {
    fn get(&self, location: &str) -> Result<FetchResponse, ErrorTypes>;
}

/// Fetches `http(s)://` locations with a blocking HTTP client and everything
/// else from the local filesystem.
pub struct DatasetFetcher {
    client: reqwest::blocking::Client,
}

impl DatasetFetcher {
    pub fn new() -> Result<Self, ErrorTypes> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| {
                ErrorTypes::new(
                    CLIENT_BUILD_FAILED,
                    format!("Failed to build HTTP client: {}", e),
                )
            })?;
        Ok(Self { client })
    }

    fn get_http(&self, url: &str) -> Result<FetchResponse, ErrorTypes> {
        let response = self.client.get(url).send().map_err(|e| {
            ErrorTypes::new(TRANSPORT_FAILED, format!("Failed to reach {}: {}", url, e))
        })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| {
            ErrorTypes::new(
                BODY_READ_FAILED,
                format!("Failed to read response from {}: {}", url, e),
            )
        })?;
        Ok(FetchResponse { status, body })
    }

    fn get_file(&self, path: &str) -> Result<FetchResponse, ErrorTypes> {
        let body = fs::read_to_string(path).map_err(|e| {
            ErrorTypes::new(TRANSPORT_FAILED, format!("Failed to read {}: {}", path, e))
        })?;
        Ok(FetchResponse { status: 200, body })
    }
}

impl Fetcher for DatasetFetcher {
    fn get(&self, location: &str) -> Result<FetchResponse, ErrorTypes> {
        debug!("GET {}", location);
        if location.starts_with("http://") || location.starts_with("https://") {
            self.get_http(location)
        } else {
            self.get_file(location)
        }
    }
}

/// Fetches one dataset and parses it, failing on any non-2xx status.
pub fn fetch_collection(
    fetcher: &dyn Fetcher,
    name: &str,
    location: &str,
) -> Result<FeatureCollection, ErrorTypes> {
    let response = fetcher.get(location)?;
    if !response.is_success() {
        return Err(ErrorTypes::new(
            HTTP_STATUS,
            format!("HTTP {} fetching {} from {}", response.status, name, location),
        ));
    }
    FeatureCollection::from_json(name, &response.body)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::error_types::MALFORMED_BODY;
    use std::io::Write;

    struct Fixed(FetchResponse);

    impl Fetcher for Fixed {
        fn get(&self, _location: &str) -> Result<FetchResponse, ErrorTypes> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_non_success_status_is_an_error() {
        let fetcher = Fixed(FetchResponse {
            status: 500,
            body: "Internal Server Error".to_string(),
        });
        let err = fetch_collection(&fetcher, "parks", "chatt_parks.geojson").unwrap_err();
        assert_eq!(err.code(), HTTP_STATUS);
        assert!(err.message().contains("HTTP 500"));
    }

    #[test]
    fn test_success_status_with_bad_body_is_malformed() {
        let fetcher = Fixed(FetchResponse::ok("{\"type\":"));
        let err = fetch_collection(&fetcher, "parks", "chatt_parks.geojson").unwrap_err();
        assert_eq!(err.code(), MALFORMED_BODY);
    }

    #[test]
    fn test_reads_local_files() {
        let path = std::env::temp_dir().join(format!(
            "parks_trails_fetcher_{}.geojson",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"type":"FeatureCollection","features":[]}}"#).unwrap();

        let fetcher = DatasetFetcher::new().unwrap();
        let collection =
            fetch_collection(&fetcher, "trails", path.to_str().unwrap()).unwrap();
        assert!(collection.is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_a_transport_error() {
        let fetcher = DatasetFetcher::new().unwrap();
        let err = fetcher.get("/definitely/not/here.geojson").unwrap_err();
        assert_eq!(err.code(), TRANSPORT_FAILED);
    }
}
