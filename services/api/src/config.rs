//! Service configuration loaded from environment variables

use anyhow::Result;
use std::env;

/// Top-level configuration for the API service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    pub jwt: JwtConfig,
    pub media: MediaConfig,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,
    /// Secret for signing refresh tokens
    pub refresh_secret: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 10 days)
    pub refresh_token_expiry: u64,
}

/// Object-storage and upload spooling configuration
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Bucket all media objects are stored in
    pub bucket: String,
    /// Public base URL objects are served from
    pub public_base_url: String,
    /// Directory multipart uploads are spooled to before ingestion
    pub upload_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            jwt: JwtConfig::from_env()?,
            media: MediaConfig::from_env()?,
        })
    }
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_ACCESS_SECRET`: HS256 secret for access tokens
    /// - `JWT_REFRESH_SECRET`: HS256 secret for refresh tokens
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 864000)
    pub fn from_env() -> Result<Self> {
        let access_secret = env::var("JWT_ACCESS_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_ACCESS_SECRET environment variable not set"))?;
        let refresh_secret = env::var("JWT_REFRESH_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_REFRESH_SECRET environment variable not set"))?;

        let access_token_expiry = env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string()) // 15 minutes
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "864000".to_string()) // 10 days
            .parse()
            .unwrap_or(864_000);

        Ok(JwtConfig {
            access_secret,
            refresh_secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

impl MediaConfig {
    /// Create a new MediaConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MEDIA_BUCKET_NAME`: S3 bucket media objects are stored in
    /// - `MEDIA_PUBLIC_URL`: Base URL the bucket is served from
    /// - `UPLOAD_DIR`: Local spool directory (default: "./tmp/uploads")
    pub fn from_env() -> Result<Self> {
        let bucket =
            env::var("MEDIA_BUCKET_NAME").unwrap_or_else(|_| "streamtube-media".to_string());
        let public_base_url = env::var("MEDIA_PUBLIC_URL")
            .unwrap_or_else(|_| format!("https://{bucket}.s3.amazonaws.com"));
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./tmp/uploads".to_string());

        Ok(MediaConfig {
            bucket,
            public_base_url,
            upload_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_jwt_config_requires_secrets() {
        unsafe {
            std::env::remove_var("JWT_ACCESS_SECRET");
            std::env::remove_var("JWT_REFRESH_SECRET");
        }

        assert!(JwtConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_jwt_config_defaults() {
        unsafe {
            std::env::set_var("JWT_ACCESS_SECRET", "access-secret");
            std::env::set_var("JWT_REFRESH_SECRET", "refresh-secret");
            std::env::remove_var("JWT_ACCESS_TOKEN_EXPIRY");
            std::env::remove_var("JWT_REFRESH_TOKEN_EXPIRY");
        }

        let config = JwtConfig::from_env().expect("Failed to load JWT config");
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 864_000);

        unsafe {
            std::env::remove_var("JWT_ACCESS_SECRET");
            std::env::remove_var("JWT_REFRESH_SECRET");
        }
    }

    #[test]
    #[serial]
    fn test_media_config_defaults() {
        unsafe {
            std::env::remove_var("MEDIA_BUCKET_NAME");
            std::env::remove_var("MEDIA_PUBLIC_URL");
            std::env::remove_var("UPLOAD_DIR");
        }

        let config = MediaConfig::from_env().expect("Failed to load media config");
        assert_eq!(config.bucket, "streamtube-media");
        assert_eq!(
            config.public_base_url,
            "https://streamtube-media.s3.amazonaws.com"
        );
        assert_eq!(config.upload_dir, "./tmp/uploads");
    }
}
