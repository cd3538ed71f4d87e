use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use super::{split_name, unix_millis, ImageStore, ImageStoreError};
use crate::config::CloudinaryConfig;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorResponse {
    error: UploadErrorBody,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

/// Signed uploads to the Cloudinary image upload API.
///
/// Each upload is tagged with the configured folder and a
/// `school_<unix-millis>_<8 hex>` public id; the returned reference is the
/// `secure_url` from the response.
pub struct CloudinaryImageStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryImageStore {
    pub fn new(config: CloudinaryConfig) -> Result<Self, ImageStoreError> {
        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// `school_<millis>_<8 hex>`. Cloudinary overwrites an existing public id,
    /// so uploads landing in the same millisecond must still differ.
    fn public_id(millis: i64) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("school_{millis}_{}", &suffix[..8])
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.config.api_base, self.config.cloud_name)
    }

    /// SHA-256 over `k=v` pairs sorted by key and joined with `&`, followed
    /// by the API secret.
    fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
        let to_sign = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    async fn upload_at(
        &self,
        bytes: &[u8],
        original_name: &str,
        public_id: String,
        millis: i64,
    ) -> Result<String, ImageStoreError> {
        let mut params: BTreeMap<&'static str, String> = BTreeMap::new();
        params.insert("folder", self.config.folder.clone());
        params.insert("public_id", public_id);
        params.insert("timestamp", (millis / 1000).to_string());
        let signature = Self::sign(&params, &self.config.api_secret);

        let (base, extension) = split_name(original_name);
        let mut form = Form::new()
            .part("file", Part::bytes(bytes.to_vec()).file_name(format!("{base}{extension}")))
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self.client.post(self.upload_url()).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UploadErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ImageStoreError::Rejected { status: status.as_u16(), message });
        }

        let uploaded: UploadResponse = response.json().await?;
        let url = uploaded
            .secure_url
            .filter(|url| url.starts_with("https://"))
            .ok_or(ImageStoreError::MissingUrl)?;

        debug!("Uploaded {} bytes to {}", bytes.len(), url);
        Ok(url)
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn store(&self, bytes: &[u8], original_name: &str) -> Result<String, ImageStoreError> {
        let millis = unix_millis();
        self.upload_at(bytes, original_name, Self::public_id(millis), millis).await
    }

    fn kind(&self) -> &'static str {
        "cloudinary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: &str) -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "123456".into(),
            api_secret: "abcd".into(),
            folder: "schoolImages".into(),
            api_base: api_base.into(),
        }
    }

    #[test]
    fn signature_covers_sorted_params_and_secret() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1700000000".to_string());
        params.insert("public_id", "school_1700000000000".to_string());
        params.insert("folder", "schoolImages".to_string());

        assert_eq!(
            CloudinaryImageStore::sign(&params, "abcd"),
            "1303ee5745a50584fd35b362ccc9322b9aaf2c094ef47105e322c5b1936280d6"
        );
    }

    #[tokio::test]
    async fn returns_secure_url_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/upload"))
            .and(body_string_contains("school_1700000000000"))
            .and(body_string_contains("1303ee5745a50584fd35b362ccc9322b9aaf2c094ef47105e322c5b1936280d6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "public_id": "schoolImages/school_1700000000000",
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/schoolImages/school_1700000000000.jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = CloudinaryImageStore::new(config(&server.uri())).unwrap();
        let url = store
            .upload_at(b"jpeg", "campus.jpg", "school_1700000000000".into(), 1_700_000_000_000)
            .await
            .unwrap();

        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/v1/schoolImages/school_1700000000000.jpg"
        );
    }

    fn form_value(body: &[u8], name: &str) -> Option<String> {
        let body = String::from_utf8_lossy(body);
        let marker = format!("name=\"{name}\"\r\n\r\n");
        let start = body.find(&marker)? + marker.len();
        let end = body[start..].find("\r\n")? + start;
        Some(body[start..end].to_string())
    }

    #[test]
    fn public_ids_carry_a_random_suffix() {
        let id = CloudinaryImageStore::public_id(42);
        assert!(id.starts_with("school_42_"), "{id}");
        assert_eq!(id.len(), "school_42_".len() + 8);
        assert_ne!(id, CloudinaryImageStore::public_id(42));
    }

    #[tokio::test]
    async fn uploads_in_the_same_millisecond_get_distinct_public_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/x.jpg"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let store = CloudinaryImageStore::new(config(&server.uri())).unwrap();
        for (bytes, name) in [(b"a", "first.jpg"), (b"b", "second.jpg")] {
            store
                .upload_at(bytes, name, CloudinaryImageStore::public_id(42), 42)
                .await
                .unwrap();
        }

        let requests = server.received_requests().await.unwrap();
        let ids: Vec<String> = requests
            .iter()
            .map(|r| form_value(&r.body, "public_id").unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|id| id.starts_with("school_42_")), "{ids:?}");
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn rejected_upload_reports_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Invalid Signature" }
            })))
            .mount(&server)
            .await;

        let store = CloudinaryImageStore::new(config(&server.uri())).unwrap();
        let err = store.store(b"jpeg", "campus.jpg").await.unwrap_err();

        match err {
            ImageStoreError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn insecure_url_is_not_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "http://res.cloudinary.com/demo/image/upload/x.jpg"
            })))
            .mount(&server)
            .await;

        let store = CloudinaryImageStore::new(config(&server.uri())).unwrap();
        let err = store.store(b"jpeg", "campus.jpg").await.unwrap_err();

        assert!(matches!(err, ImageStoreError::MissingUrl));
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        // Nothing listens on port 1
        let store = CloudinaryImageStore::new(config("http://127.0.0.1:1")).unwrap();
        let err = store.store(b"jpeg", "campus.jpg").await.unwrap_err();

        assert!(matches!(err, ImageStoreError::Request(_)));
    }
}
