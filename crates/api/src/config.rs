/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development; override
/// via environment variables in production.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database file path (default: `data/framecast.db`).
    pub db_path: String,
    /// Root for photos, cached thumbnails, and served thumbnails
    /// (default: `data`).
    pub data_dir: String,
    /// Bind port (default: `9607`).
    pub port: u16,
    /// Secret for the session-auth subsystem. Read here so the whole
    /// deployment is configured in one place; the delivery pipeline
    /// itself only uses opaque device tokens.
    #[allow(dead_code)]
    pub jwt_secret: String,
    /// Directory of the built frontend served at `/` (default:
    /// `./static`).
    pub static_dir: String,
    /// Allowed CORS origins, comma-separated.
    pub cors_origins: Vec<String>,
    /// Converter binary invoked by the processing bridge.
    pub converter_bin: String,
    /// Wall-clock budget for one converter run, in seconds.
    pub converter_timeout_secs: u64,
    /// Endpoint for the synthetic placeholder photo.
    pub placeholder_url: String,
    /// Directory searched for the text and icon fonts.
    pub font_dir: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                         |
    /// |--------------------------|---------------------------------|
    /// | `DB_PATH`                | `data/framecast.db`             |
    /// | `DATA_DIR`               | `data`                          |
    /// | `ADDON_PORT`             | `9607`                          |
    /// | `JWT_SECRET`             | (empty)                         |
    /// | `STATIC_DIR`             | `./static`                      |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`         |
    /// | `CONVERTER_BIN`          | `epaper-image-convert`          |
    /// | `CONVERTER_TIMEOUT_SECS` | `60`                            |
    /// | `PLACEHOLDER_URL`        | `https://picsum.photos/800/480` |
    /// | `FONT_DIR`               | `/usr/share/fonts/framecast`    |
    pub fn from_env() -> Self {
        let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "data/framecast.db".into());
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into());

        let port: u16 = std::env::var("ADDON_PORT")
            .unwrap_or_else(|_| "9607".into())
            .parse()
            .expect("ADDON_PORT must be a valid u16");

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let converter_bin =
            std::env::var("CONVERTER_BIN").unwrap_or_else(|_| "epaper-image-convert".into());

        let converter_timeout_secs: u64 = std::env::var("CONVERTER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("CONVERTER_TIMEOUT_SECS must be a valid u64");

        let placeholder_url = std::env::var("PLACEHOLDER_URL")
            .unwrap_or_else(|_| "https://picsum.photos/800/480".into());

        let font_dir =
            std::env::var("FONT_DIR").unwrap_or_else(|_| "/usr/share/fonts/framecast".into());

        Self {
            db_path,
            data_dir,
            port,
            jwt_secret,
            static_dir,
            cors_origins,
            converter_bin,
            converter_timeout_secs,
            placeholder_url,
            font_dir,
        }
    }
}
