use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    /// Bearer token protecting the /admin router. None disables admin routes.
    pub admin_token: Option<String>,
    pub dev_mode: bool,
    /// Seconds between extension-claim auto-approval sweeps.
    pub sweep_interval_secs: u64,
    /// Resend API key for outbound notifications. None = log only.
    pub resend_api_key: Option<String>,
    pub email_from: String,
    /// Stripe secret key for Connect transfers on withdrawal approval.
    pub stripe_secret_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("BINDERY_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let sweep_interval_secs: u64 = env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "bindery.db".to_string()),
            base_url,
            admin_token: env::var("ADMIN_TOKEN").ok(),
            dev_mode,
            sweep_interval_secs,
            resend_api_key: env::var("RESEND_API_KEY").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Bindery <noreply@bindery.press>".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok(),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
