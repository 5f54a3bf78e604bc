use std::env;

const DEFAULT_BUCKET: &str = "punwarkaschoolBucket";
const DEFAULT_TABLE_PREFIX: &str = "punwarka_";
const DEFAULT_DB_PATH: &str = "./punwarka-cms.db";

#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `None` when the hosted service is not configured; content then lives in
    /// the local database at `db_path`.
    pub supabase: Option<SupabaseSettings>,
    pub bucket: String,
    pub table_prefix: String,
    pub db_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let url = var("SUPABASE_URL");
        let api_key = var("SUPABASE_KEY").or_else(|| var("SUPABASE_ANON_KEY"));
        let supabase = match (url, api_key) {
            (Some(url), Some(api_key)) => Some(SupabaseSettings { url, api_key }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("Only one of SUPABASE_URL and SUPABASE_KEY is set, ignoring both");
                None
            }
            (None, None) => None,
        };

        Self {
            supabase,
            bucket: var("SUPABASE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            table_prefix: var("CMS_TABLE_PREFIX")
                .unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_string()),
            db_path: var("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        }
    }
}
