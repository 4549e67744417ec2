// API module entry
// Creature query service: path matching and dispatch to the lookup handlers

mod error;
mod handlers;
mod response;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::store::Store;

const COLLECTION: &str = "/pokemon";

/// A matched query route with its decoded path parameter
#[derive(Debug, PartialEq, Eq)]
pub enum PokemonRoute {
    List,
    ByName(String),
    ByType(String),
}

/// Match a request path against the query routes
///
/// Parameters are single percent-decoded path segments; anything with extra
/// segments, an empty segment or invalid UTF-8 does not match.
pub fn match_route(path: &str) -> Option<PokemonRoute> {
    if path == COLLECTION {
        return Some(PokemonRoute::List);
    }
    let rest = path.strip_prefix(COLLECTION)?.strip_prefix('/')?;

    match rest.split('/').collect::<Vec<_>>().as_slice() {
        [name] => decode_segment(name).map(PokemonRoute::ByName),
        ["type", type_name] => decode_segment(type_name).map(PokemonRoute::ByType),
        _ => None,
    }
}

fn decode_segment(segment: &str) -> Option<String> {
    if segment.is_empty() {
        return None;
    }
    urlencoding::decode(segment).ok().map(std::borrow::Cow::into_owned)
}

/// Run the matched lookup and build its response
pub async fn dispatch(route: &PokemonRoute, store: &Store, is_head: bool) -> Response<Full<Bytes>> {
    match route {
        PokemonRoute::List => response::into_response(handlers::list_pokemon(store).await, is_head),
        PokemonRoute::ByName(name) => {
            response::into_response(handlers::get_pokemon(store, name).await, is_head)
        }
        PokemonRoute::ByType(type_name) => {
            response::into_response(handlers::get_pokemon_by_type(store, type_name).await, is_head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_list() {
        assert_eq!(match_route("/pokemon"), Some(PokemonRoute::List));
    }

    #[test]
    fn test_match_by_name() {
        assert_eq!(
            match_route("/pokemon/bulbasaur"),
            Some(PokemonRoute::ByName("bulbasaur".to_string()))
        );
        assert_eq!(
            match_route("/pokemon/Mr.%20Mime"),
            Some(PokemonRoute::ByName("Mr. Mime".to_string()))
        );
        // A bare "type" segment is just a name
        assert_eq!(
            match_route("/pokemon/type"),
            Some(PokemonRoute::ByName("type".to_string()))
        );
    }

    #[test]
    fn test_match_by_type() {
        assert_eq!(
            match_route("/pokemon/type/poison"),
            Some(PokemonRoute::ByType("poison".to_string()))
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_route("/"), None);
        assert_eq!(match_route("/pokemon/"), None);
        assert_eq!(match_route("/pokemonx"), None);
        assert_eq!(match_route("/pokemon/type/"), None);
        assert_eq!(match_route("/pokemon/a/b"), None);
        assert_eq!(match_route("/pokemon/type/grass/extra"), None);
        assert_eq!(match_route("/pokemon/%FF"), None);
    }
}
