use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub identity_api_url: String,

    pub translate_api_url: String,
    pub translate_api_key: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            identity_api_url: env::var("IDENTITY_API_URL")
                .unwrap_or_else(|_| "https://api.mantracare.com/user/user-info".into()),

            translate_api_url: env::var("TRANSLATE_API_URL").unwrap_or_else(|_| {
                "https://translation.googleapis.com/language/translate/v2".into()
            }),
            translate_api_key: env::var("TRANSLATE_API_KEY").unwrap_or_else(|_| String::new()),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
