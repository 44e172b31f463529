//! HTTP client for the backend REST API.

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use common::{AppError, AppResult, HttpClientConfig};
use domain::{
    Family, Group, HierarchyPath, Level, NewNode, Requirement, RequirementUpdate, Subgroup, User,
    UserSummary, ValidUser,
};

use super::api::AdminApi;
use super::csrf::{resolve_token, CSRF_HEADER};
use super::wire::{
    CreatedNodeDto, FamilyDto, GroupDto, HierarchyPathDto, NodePayload, RequirementDto,
    RequirementUpdatePayload, SubgroupDto, UserDto, UserPayload, UserSummaryDto,
};

/// reqwest wrapper speaking the backend's JSON API.
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    cookie: Option<String>,
    csrf_token: Option<String>,
}

impl HttpApiClient {
    /// Build a client from configuration.
    pub fn new(config: &HttpClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::config(format!("cannot build HTTP client: {}", e)))?;

        let csrf_token = resolve_token(config.csrf_token.as_deref(), config.csrf_cookie.as_deref());
        let cookie = Self::cookie_header(config, csrf_token.as_deref());

        debug!("HTTP client ready for {}", config.base_url());
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            cookie,
            csrf_token,
        })
    }

    // Session cookie plus the CSRF cookie the backend compares the header against
    fn cookie_header(config: &HttpClientConfig, csrf_token: Option<&str>) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(session) = config.session_cookie.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("sessionid={}", session));
        }
        if let Some(token) = csrf_token {
            parts.push(format!("csrftoken={}", token));
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mutating = method != Method::GET;
        debug!("{} {}", method, path);

        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if mutating {
            match &self.csrf_token {
                Some(token) => builder = builder.header(CSRF_HEADER, token),
                None => warn!("No CSRF token configured for {}", path),
            }
        }
        builder
    }

    /// Turn a non-2xx response into an error, reading `{ "error": ... }` when present.
    async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::from_response(status.as_u16(), &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.request(method, path).json(body).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, method: Method, path: &str) -> AppResult<()> {
        let response = self.request(method, path).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AdminApi for HttpApiClient {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        let dtos: Vec<UserDto> = self.get_json("/api/usuarios/").await?;
        let mut users = Vec::with_capacity(dtos.len());
        for dto in dtos {
            let id = dto.id_usuario;
            match User::try_from(dto) {
                Ok(user) => users.push(user),
                // One malformed row should not hide the rest of the list
                Err(e) => warn!("Skipping user {}: {}", id, e),
            }
        }
        Ok(users)
    }

    async fn get_user(&self, id: i64) -> AppResult<User> {
        let dto: UserDto = self.get_json(&format!("/api/usuarios/{}/", id)).await?;
        User::try_from(dto)
    }

    async fn search_users(&self, query: &str) -> AppResult<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .request(Method::GET, "/api/usuarios/buscar/")
            .query(&[("q", query)])
            .send()
            .await?;
        let dtos: Vec<UserSummaryDto> = Self::check(response).await?.json().await?;
        Ok(dtos.into_iter().map(UserSummary::from).collect())
    }

    async fn create_user(&self, user: &ValidUser) -> AppResult<UserSummary> {
        let payload = UserPayload::from(user);
        let dto: UserSummaryDto = self
            .send_json(Method::POST, "/api/usuarios/", &payload)
            .await?;
        Ok(dto.into())
    }

    async fn update_user(&self, id: i64, user: &ValidUser) -> AppResult<UserSummary> {
        let payload = UserPayload::from(user);
        let dto: UserSummaryDto = self
            .send_json(Method::PUT, &format!("/api/usuarios/{}/", id), &payload)
            .await?;
        Ok(dto.into())
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.send_empty(Method::DELETE, &format!("/api/usuarios/{}/", id))
            .await
    }

    async fn list_families(&self) -> AppResult<Vec<Family>> {
        let dtos: Vec<FamilyDto> = self.get_json("/api/familias/").await?;
        Ok(dtos.into_iter().map(Family::from).collect())
    }

    async fn list_groups(&self, family_id: i64) -> AppResult<Vec<Group>> {
        let dtos: Vec<GroupDto> = self
            .get_json(&format!("/api/grupos/?familia_id={}", family_id))
            .await?;
        Ok(dtos.into_iter().map(Group::from).collect())
    }

    async fn list_subgroups(&self, group_id: i64) -> AppResult<Vec<Subgroup>> {
        let dtos: Vec<SubgroupDto> = self
            .get_json(&format!("/api/subgrupos/?grupo_id={}", group_id))
            .await?;
        Ok(dtos.into_iter().map(Subgroup::from).collect())
    }

    async fn list_requirements(&self, subgroup_id: Option<i64>) -> AppResult<Vec<Requirement>> {
        let path = match subgroup_id {
            Some(id) => format!("/api/requerimientos/?subgrupo_id={}", id),
            None => "/api/requerimientos/".to_string(),
        };
        let dtos: Vec<RequirementDto> = self.get_json(&path).await?;
        let mut requirements = Vec::with_capacity(dtos.len());
        for dto in dtos {
            let id = dto.id;
            match Requirement::try_from(dto) {
                Ok(requirement) => requirements.push(requirement),
                Err(e) => warn!("Skipping requirement {}: {}", id, e),
            }
        }
        Ok(requirements)
    }

    async fn get_requirement(&self, id: i64) -> AppResult<Requirement> {
        let dto: RequirementDto = self
            .get_json(&format!("/api/requerimientos/{}/", id))
            .await?;
        Requirement::try_from(dto)
    }

    async fn hierarchy_path(&self, requirement_id: i64) -> AppResult<HierarchyPath> {
        let dto: HierarchyPathDto = self
            .get_json(&format!("/api/requerimiento_ruta_completa/{}/", requirement_id))
            .await?;
        Ok(dto.into())
    }

    async fn create_node(&self, node: &NewNode) -> AppResult<i64> {
        let payload = NodePayload::from(node);
        let path = format!("/api/{}/", node.level.collection());
        let created: CreatedNodeDto = self.send_json(Method::POST, &path, &payload).await?;
        Ok(created.id)
    }

    async fn update_requirement(&self, id: i64, update: &RequirementUpdate) -> AppResult<()> {
        let payload = RequirementUpdatePayload::from(update);
        let _: serde_json::Value = self
            .send_json(Method::PUT, &format!("/api/requerimientos/{}/", id), &payload)
            .await?;
        Ok(())
    }

    async fn delete_node(&self, level: Level, id: i64) -> AppResult<()> {
        self.send_empty(Method::DELETE, &format!("/api/{}/{}/", level.collection(), id))
            .await
    }
}
