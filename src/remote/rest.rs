//! HTTP client for a hosted Postgres REST API (`/rest/v1`) and its auth
//! service (`/auth/v1`).

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{AuthProvider, DutyTable, Session, User};
use crate::config::RemoteConfig;
use crate::error::{Result, StoreError};
use crate::models::DutyRow;

const TABLE: &str = "duties";
const TIMEOUT_SECS: u64 = 15;

#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

/// 认证接口返回的会话
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<User>,
}

impl RestClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// 带 apikey 和用户令牌
    fn authed(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    fn send(builder: RequestBuilder) -> Result<Response> {
        let resp = builder.send()?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().unwrap_or_else(|_| "unknown".to_string());
            return Err(StoreError::Remote { status, message });
        }
        Ok(resp)
    }

    fn into_session(token: TokenResponse) -> Option<Session> {
        Some(Session {
            access_token: token.access_token?,
            refresh_token: token.refresh_token,
            user: token.user?,
        })
    }
}

impl DutyTable for RestClient {
    fn fetch_for_user(&self, session: &Session) -> Result<Vec<DutyRow>> {
        let builder = self.client.get(self.table_url()).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", session.user_id())),
            ("order", "created_at.asc".to_string()),
        ]);

        let rows: Vec<Value> = Self::send(self.authed(builder, session))?.json()?;
        Ok(DutyRow::from_values(rows))
    }

    fn insert(&self, session: &Session, rows: &[DutyRow]) -> Result<Vec<DutyRow>> {
        let builder = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(rows);

        let inserted: Vec<Value> = Self::send(self.authed(builder, session))?.json()?;
        Ok(DutyRow::from_values(inserted))
    }

    fn update_completed_days(&self, session: &Session, id: i64, days: &[String]) -> Result<()> {
        let builder = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{}", id))])
            .json(&json!({ "completed_days": days }));

        Self::send(self.authed(builder, session))?;
        Ok(())
    }

    fn delete(&self, session: &Session, id: i64) -> Result<()> {
        let builder = self
            .client
            .delete(self.table_url())
            .query(&[("id", format!("eq.{}", id))]);

        Self::send(self.authed(builder, session))?;
        Ok(())
    }
}

impl AuthProvider for RestClient {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let builder = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }));

        let token: TokenResponse = Self::send(builder)?.json()?;
        Self::into_session(token).ok_or(StoreError::Remote {
            status: 200,
            message: "sign-in response carried no session".to_string(),
        })
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let builder = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }));

        let token: TokenResponse = Self::send(builder)?.json()?;
        Ok(Self::into_session(token))
    }

    fn sign_out(&self, session: &Session) -> Result<()> {
        let builder = self.client.post(self.auth_url("logout"));
        Self::send(self.authed(builder, session))?;
        Ok(())
    }
}
