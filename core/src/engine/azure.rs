//! Azure Blob Storage target for the upload phase.
//!
//! Only `Put Blob` is needed. Requests are authorised either with the account
//! shared key (HMAC-SHA256 over the canonical request) or with a SAS token,
//! whichever the connection string carries.

use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{
	header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
	Body, Client, Url,
};
use sha2::Sha256;
use tokio_util::io::ReaderStream;

use crate::engine::uploader::{ObjectStore, UploadError};

const API_VERSION: &str = "2021-08-06";
const BLOB_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
enum Credential {
	SharedKey(Vec<u8>),
	Sas(String),
}

/// One container in one storage account.
#[derive(Debug, Clone)]
pub struct AzureBlobStore {
	client: Client,
	account: String,
	/// Base URL of the blob service, without trailing slash.
	endpoint: String,
	container: String,
	credential: Credential,
}

impl AzureBlobStore {
	/// Parse a standard Azure storage connection string
	/// (`AccountName=..;AccountKey=..` or `BlobEndpoint=..;SharedAccessSignature=..`).
	pub fn from_connection_string(connection_string: &str, container: &str) -> Result<Self, UploadError> {
		let mut protocol = "https".to_string();
		let mut account = None;
		let mut account_key = None;
		let mut suffix = "core.windows.net".to_string();
		let mut blob_endpoint = None;
		let mut sas = None;

		for part in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
			let Some((key, value)) = part.split_once('=') else {
				return Err(UploadError::Config(format!("malformed connection string segment '{part}'")));
			};
			match key {
				"DefaultEndpointsProtocol" => protocol = value.to_string(),
				"AccountName" => account = Some(value.to_string()),
				"AccountKey" => account_key = Some(value.to_string()),
				"EndpointSuffix" => suffix = value.to_string(),
				"BlobEndpoint" => blob_endpoint = Some(value.trim_end_matches('/').to_string()),
				"SharedAccessSignature" => sas = Some(value.trim_start_matches('?').to_string()),
				_ => {}
			}
		}

		if container.trim().is_empty() {
			return Err(UploadError::Config("container name is empty".to_string()));
		}

		let credential = match (sas, account_key) {
			(Some(token), _) => Credential::Sas(token),
			(None, Some(key)) => Credential::SharedKey(
				STANDARD
					.decode(key)
					.map_err(|e| UploadError::Config(format!("AccountKey is not base64: {e}")))?,
			),
			(None, None) => {
				return Err(UploadError::Config(
					"connection string has neither AccountKey nor SharedAccessSignature".to_string(),
				))
			}
		};

		let endpoint = match (&blob_endpoint, &account) {
			(Some(endpoint), _) => endpoint.clone(),
			(None, Some(account)) => format!("{protocol}://{account}.blob.{suffix}"),
			(None, None) => {
				return Err(UploadError::Config(
					"connection string has neither AccountName nor BlobEndpoint".to_string(),
				))
			}
		};

		if matches!(credential, Credential::SharedKey(_)) && account.is_none() {
			return Err(UploadError::Config("shared key auth requires AccountName".to_string()));
		}

		Ok(Self {
			client: Client::new(),
			account: account.unwrap_or_default(),
			endpoint,
			container: container.to_string(),
			credential,
		})
	}

	/// URL of the blob for `key`, each path segment percent-encoded.
	fn blob_url(&self, key: &str) -> Result<Url, UploadError> {
		let encoded: Vec<String> = key
			.split('/')
			.filter(|s| !s.is_empty())
			.map(|s| urlencoding::encode(s).into_owned())
			.collect();
		let mut url = format!("{}/{}/{}", self.endpoint, self.container, encoded.join("/"));
		if let Credential::Sas(token) = &self.credential {
			url.push('?');
			url.push_str(token);
		}
		Url::parse(&url).map_err(|e| UploadError::Config(format!("invalid blob url {url}: {e}")))
	}

	fn shared_key_signature(&self, key: &[u8], url: &Url, date: &str, content_length: u64) -> Result<String, UploadError> {
		let length = if content_length == 0 {
			String::new()
		} else {
			content_length.to_string()
		};
		let canonical_headers =
			format!("x-ms-blob-type:BlockBlob\nx-ms-date:{date}\nx-ms-version:{API_VERSION}\n");
		let canonical_resource = format!("/{}{}", self.account, url.path());

		let string_to_sign = format!(
			"PUT\n\n\n{length}\n\n{BLOB_CONTENT_TYPE}\n\n\n\n\n\n\n{canonical_headers}{canonical_resource}"
		);

		let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(|e| UploadError::Config(e.to_string()))?;
		mac.update(string_to_sign.as_bytes());
		Ok(STANDARD.encode(mac.finalize().into_bytes()))
	}
}

#[async_trait]
impl ObjectStore for AzureBlobStore {
	async fn put(&self, key: &str, artifact: &Path) -> Result<(), UploadError> {
		let read_error = |e: std::io::Error| UploadError::Read {
			path: artifact.display().to_string(),
			reason: e.to_string(),
		};
		let file = tokio::fs::File::open(artifact).await.map_err(read_error)?;
		let content_length = file.metadata().await.map_err(read_error)?.len();

		let url = self.blob_url(key)?;
		let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();

		let mut request = self
			.client
			.put(url.clone())
			.header("x-ms-blob-type", "BlockBlob")
			.header("x-ms-date", &date)
			.header("x-ms-version", API_VERSION)
			.header(CONTENT_TYPE, BLOB_CONTENT_TYPE)
			.header(CONTENT_LENGTH, content_length);

		if let Credential::SharedKey(secret) = &self.credential {
			let signature = self.shared_key_signature(secret, &url, &date, content_length)?;
			request = request.header(AUTHORIZATION, format!("SharedKey {}:{signature}", self.account));
		}

		let response = request
			.body(Body::wrap_stream(ReaderStream::new(file)))
			.send()
			.await
			.map_err(|e| UploadError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let detail = response.text().await.unwrap_or_default();
			return Err(UploadError::Rejected {
				status: status.as_u16(),
				detail: detail.chars().take(512).collect(),
			});
		}
		Ok(())
	}
}
