// Creature lookup handlers
// One store read per call; empty results become ApiError::NotFound where the
// lookup promises a match

use super::error::ApiError;
use crate::store::{Pokemon, Store};

/// `GET /pokemon`: every record, empty list allowed
pub async fn list_pokemon(store: &Store) -> Result<Vec<Pokemon>, ApiError> {
    Ok(store.list_all().await?)
}

/// `GET /pokemon/{name}`: case-insensitive exact name match
pub async fn get_pokemon(store: &Store, name: &str) -> Result<Pokemon, ApiError> {
    store
        .find_by_name(name)
        .await?
        .ok_or_else(ApiError::pokemon_not_found)
}

/// `GET /pokemon/type/{type_name}`: records with the type in either slot
pub async fn get_pokemon_by_type(store: &Store, type_name: &str) -> Result<Vec<Pokemon>, ApiError> {
    let matches = store.find_by_type(type_name).await?;
    if matches.is_empty() {
        return Err(ApiError::type_not_found(type_name));
    }
    Ok(matches)
}
