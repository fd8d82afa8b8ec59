//! Car image storage behind an S3-compatible object store.

use crate::config::StorageSettings;
use crate::error::AppError;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use uuid::Uuid;

/// One uploaded image file as received from a multipart form.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return the object's public URL.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError>;

    async fn delete(&self, keys: &[String]) -> Result<(), AppError>;

    /// Object key for a public URL produced by [`ObjectStore::put`]; `None` for foreign URLs.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

/// File extension for an `image/*` content type.
pub fn image_extension(content_type: &str) -> Result<&str, AppError> {
    let subtype = content_type
        .trim()
        .strip_prefix("image/")
        .map(|s| s.split(';').next().unwrap_or("").trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("not an image: '{}'", content_type)))?;
    Ok(match subtype {
        "jpeg" | "pjpeg" => "jpg",
        "svg+xml" => "svg",
        other if other.chars().all(|c| c.is_ascii_alphanumeric()) => other,
        _ => "bin",
    })
}

/// `cars/{car_id}/{random}.{ext}`
pub fn car_image_key(car_id: Uuid, content_type: &str) -> Result<String, AppError> {
    let ext = image_extension(content_type)?;
    Ok(format!("cars/{}/{}.{}", car_id, Uuid::new_v4(), ext))
}

fn public_prefix(public_url: &str, bucket: &str) -> String {
    format!("{}/{}/", public_url.trim_end_matches('/'), bucket)
}

/// Supabase Storage through its S3 endpoint.
pub struct S3Store {
    client: Client,
    bucket: String,
    public_prefix: String,
}

impl S3Store {
    pub fn new(settings: &StorageSettings) -> Self {
        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            None,
            None,
            "dealership-settings",
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .endpoint_url(settings.endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        S3Store {
            client: Client::from_conf(config),
            bucket: settings.bucket.clone(),
            public_prefix: public_prefix(&settings.public_url, &settings.bucket),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload {}: {}", key, DisplayErrorContext(e))))?;
        tracing::debug!(key, size, "object stored");
        Ok(format!("{}{}", self.public_prefix, key))
    }

    async fn delete(&self, keys: &[String]) -> Result<(), AppError> {
        let objects = keys
            .iter()
            .map(|k| ObjectIdentifier::builder().key(k).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(e.to_string()))?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| AppError::Storage(e.to_string()))?;
        self.client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("delete: {}", DisplayErrorContext(e))))?;
        tracing::debug!(count = keys.len(), "objects deleted");
        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        key_from_public_url(&self.public_prefix, url)
    }
}

fn key_from_public_url(prefix: &str, url: &str) -> Option<String> {
    url.strip_prefix(prefix)
        .map(|k| k.split(['?', '#']).next().unwrap_or(k))
        .filter(|k| !k.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_follow_content_type() {
        assert_eq!(image_extension("image/jpeg").unwrap(), "jpg");
        assert_eq!(image_extension("image/png").unwrap(), "png");
        assert_eq!(image_extension("image/webp; charset=binary").unwrap(), "webp");
        assert!(matches!(image_extension("application/pdf"), Err(AppError::Validation(_))));
        assert!(image_extension("image/").is_err());
    }

    #[test]
    fn keys_live_under_the_car() {
        let id = Uuid::new_v4();
        let key = car_image_key(id, "image/png").unwrap();
        assert!(key.starts_with(&format!("cars/{}/", id)));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn public_urls_map_back_to_keys() {
        let prefix = public_prefix("https://x.supabase.co/storage/v1/object/public/", "car-images");
        assert_eq!(prefix, "https://x.supabase.co/storage/v1/object/public/car-images/");
        let url = format!("{}cars/1/a.jpg?v=2", prefix);
        assert_eq!(key_from_public_url(&prefix, &url).as_deref(), Some("cars/1/a.jpg"));
        assert_eq!(key_from_public_url(&prefix, "https://elsewhere.com/a.jpg"), None);
    }
}
