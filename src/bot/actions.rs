//! Inline button actions.
//!
//! A callback payload is parsed once into an [`Action`]; everything downstream
//! matches on the enum. Payloads are `<tag>` or `<tag>:<place id>`.

use std::fmt;
use std::str::FromStr;

// Menu entries
pub const ADD_PLACE: &str = "add_place";
pub const MANAGE_PLACES: &str = "manage_places";
pub const PLACES: &str = "places";
pub const MY_PLACES: &str = "my_places";
pub const FAVORITES: &str = "favorites";

// Place actions, followed by `:<place id>`
pub const EDIT_NAME: &str = "edit_name";
pub const EDIT_TYPE: &str = "edit_type";
pub const DELETE: &str = "delete";
pub const FAVORITE_ADD: &str = "fav_add";
pub const FAVORITE_REMOVE: &str = "fav_del";
pub const VISITED: &str = "visited";
pub const REVIEWS: &str = "reviews";

/// A parsed button press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddPlace,
    ManagePlaces,
    EditName(i64),
    EditType(i64),
    DeletePlace(i64),
    Places,
    MyPlaces,
    Favorites,
    AddFavorite(i64),
    RemoveFavorite(i64),
    Visited(i64),
    Reviews(i64),
}

impl Action {
    /// Actions only administrators may trigger
    pub const fn requires_admin(self) -> bool {
        matches!(
            self,
            Action::AddPlace
                | Action::ManagePlaces
                | Action::EditName(_)
                | Action::EditType(_)
                | Action::DeletePlace(_)
        )
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Action::AddPlace => ADD_PLACE,
            Action::ManagePlaces => MANAGE_PLACES,
            Action::EditName(_) => EDIT_NAME,
            Action::EditType(_) => EDIT_TYPE,
            Action::DeletePlace(_) => DELETE,
            Action::Places => PLACES,
            Action::MyPlaces => MY_PLACES,
            Action::Favorites => FAVORITES,
            Action::AddFavorite(_) => FAVORITE_ADD,
            Action::RemoveFavorite(_) => FAVORITE_REMOVE,
            Action::Visited(_) => VISITED,
            Action::Reviews(_) => REVIEWS,
        }
    }

    /// Place the action targets, if any
    pub const fn place_id(self) -> Option<i64> {
        match self {
            Action::EditName(id)
            | Action::EditType(id)
            | Action::DeletePlace(id)
            | Action::AddFavorite(id)
            | Action::RemoveFavorite(id)
            | Action::Visited(id)
            | Action::Reviews(id) => Some(id),
            Action::AddPlace
            | Action::ManagePlaces
            | Action::Places
            | Action::MyPlaces
            | Action::Favorites => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.place_id() {
            Some(id) => write!(f, "{}:{id}", self.tag()),
            None => f.write_str(self.tag()),
        }
    }
}

/// Callback payload that does not name a known action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action payload {:?}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownAction(payload.to_string());

        let (tag, place_id) = match payload.split_once(':') {
            Some((tag, id)) => (tag, Some(id.parse::<i64>().map_err(|_| unknown())?)),
            None => (payload, None),
        };

        let action = match (tag, place_id) {
            (ADD_PLACE, None) => Action::AddPlace,
            (MANAGE_PLACES, None) => Action::ManagePlaces,
            (PLACES, None) => Action::Places,
            (MY_PLACES, None) => Action::MyPlaces,
            (FAVORITES, None) => Action::Favorites,
            (EDIT_NAME, Some(id)) => Action::EditName(id),
            (EDIT_TYPE, Some(id)) => Action::EditType(id),
            (DELETE, Some(id)) => Action::DeletePlace(id),
            (FAVORITE_ADD, Some(id)) => Action::AddFavorite(id),
            (FAVORITE_REMOVE, Some(id)) => Action::RemoveFavorite(id),
            (VISITED, Some(id)) => Action::Visited(id),
            (REVIEWS, Some(id)) => Action::Reviews(id),
            _ => return Err(unknown()),
        };

        Ok(action)
    }
}
