//! In-memory backend for tests

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{
    ApiError, ApiResult, ChangePasswordRequest, LoginRequest, LoginResponse, PlantApi,
    PlantRequest, PlantResponse, RegisterRequest, RegisterResponse,
};

#[derive(Debug, Default)]
struct FakeState {
    offline: bool,
    delete_failure: Option<u16>,
    failing_updates: bool,
    plants: BTreeMap<i64, PlantResponse>,
    users: Vec<(i64, String, String, String)>,
    next_id: i64,
    calls: Vec<String>,
}

/// Behaves like the hosted backend: water_frequency is dropped on write,
/// updates of unknown ids succeed without storing anything, and listings
/// come back newest id first.
#[derive(Debug, Clone, Default)]
pub struct FakePlantApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakePlantApi {
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Reject deletes while listings keep working
    pub fn set_failing_deletes(&self, failing: bool) {
        self.state.lock().unwrap().delete_failure = failing.then_some(500);
    }

    /// Answer every delete with `status`, like a proxy in front of the backend
    pub fn reject_deletes_with(&self, status: u16) {
        self.state.lock().unwrap().delete_failure = Some(status);
    }

    /// Reject updates while listings keep working
    pub fn set_failing_updates(&self, failing: bool) {
        self.state.lock().unwrap().failing_updates = failing;
    }

    pub fn put_plant(&self, plant: PlantResponse) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(plant.id);
        state.plants.insert(plant.id, plant);
    }

    pub fn plant(&self, id: i64) -> Option<PlantResponse> {
        self.state.lock().unwrap().plants.get(&id).cloned()
    }

    pub fn plant_count(&self) -> usize {
        self.state.lock().unwrap().plants.len()
    }

    pub fn add_user(&self, id: i64, name: &str, email: &str, password: &str) {
        self.state.lock().unwrap().users.push((
            id,
            name.to_string(),
            email.to_string(),
            password.to_string(),
        ));
    }

    pub fn password_of(&self, id: i64) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|user| user.0 == id)
            .map(|user| user.3.clone())
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn begin(&self, call: String) -> ApiResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.offline {
            return Err(ApiError::Api {
                status: 503,
                message: "offline (503)".to_string(),
            });
        }
        Ok(state)
    }

    fn stored(id: i64, request: &PlantRequest) -> PlantResponse {
        PlantResponse {
            id,
            user_id: Some(request.user_id),
            name: Some(request.name.clone()),
            description: Some(request.description.clone()),
            photo_url: Some(request.photo_url.clone()),
            next_watering: Some(request.next_watering.clone()),
            last_watering: request.last_watering.clone(),
            light_level: request.light_level,
            water_frequency: None,
        }
    }
}

impl PlantApi for FakePlantApi {
    async fn list_plants(&self, user_id: i64) -> ApiResult<Vec<PlantResponse>> {
        let state = self.begin(format!("GET /plants/{user_id}"))?;
        Ok(state
            .plants
            .values()
            .rev()
            .filter(|plant| plant.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn create_plant(&self, plant: &PlantRequest) -> ApiResult<i64> {
        let mut state = self.begin("POST /plants".to_string())?;
        state.next_id += 1;
        let id = state.next_id;
        state.plants.insert(id, Self::stored(id, plant));
        Ok(id)
    }

    async fn update_plant(&self, id: i64, plant: &PlantRequest) -> ApiResult<()> {
        let mut state = self.begin(format!("PUT /plants/{id}"))?;
        if state.failing_updates {
            return Err(ApiError::Api {
                status: 500,
                message: "HTTP 500".to_string(),
            });
        }
        if let Some(stored) = state.plants.get_mut(&id) {
            *stored = Self::stored(id, plant);
        }
        Ok(())
    }

    async fn delete_plant(&self, id: i64) -> ApiResult<()> {
        let mut state = self.begin(format!("DELETE /plants/{id}"))?;
        if let Some(status) = state.delete_failure {
            return Err(ApiError::Api {
                status,
                message: format!("HTTP {status}"),
            });
        }
        state.plants.remove(&id);
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        let state = self.begin("POST /auth/login".to_string())?;
        state
            .users
            .iter()
            .find(|user| user.2 == request.email && user.3 == request.password)
            .map(|user| LoginResponse {
                user_id: user.0,
                name: user.1.clone(),
                message: None,
            })
            .ok_or_else(|| ApiError::Api {
                status: 401,
                message: "Wrong credentials (401)".to_string(),
            })
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        let mut state = self.begin("POST /auth/register".to_string())?;
        if state.users.iter().any(|user| user.2 == request.email) {
            return Err(ApiError::Api {
                status: 400,
                message: "Email already exists (400)".to_string(),
            });
        }
        let id = i64::try_from(state.users.len()).unwrap() + 100;
        state.users.push((
            id,
            request.name.clone(),
            request.email.clone(),
            request.password.clone(),
        ));
        Ok(RegisterResponse { id, message: None })
    }

    async fn change_password(&self, request: &ChangePasswordRequest) -> ApiResult<()> {
        let mut state = self.begin("PUT /auth/change-password".to_string())?;
        let user = state
            .users
            .iter_mut()
            .find(|user| user.0 == request.user_id && user.3 == request.old_password)
            .ok_or_else(|| ApiError::Api {
                status: 401,
                message: "Wrong password (401)".to_string(),
            })?;
        user.3.clone_from(&request.new_password);
        Ok(())
    }
}
