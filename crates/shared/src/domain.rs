use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MovieId);
id_newtype!(GenreId);
id_newtype!(PlaylistId);
id_newtype!(EntryId);
id_newtype!(UserId);

impl PlaylistId {
    /// Backend identifiers start at 1.
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

/// Which catalog listing the browse screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieSource {
    #[default]
    Popular,
    Search,
    Genre,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "release_date.desc")]
    ReleaseDateDesc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::PopularityDesc => "popularity.desc",
            Self::ReleaseDateDesc => "release_date.desc",
            Self::VoteAverageDesc => "vote_average.desc",
        }
    }
}

/// A fully resolved catalog query, captured when a fetch is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovieQuery {
    Popular,
    Search(String),
    Genre(GenreId),
}

impl MovieQuery {
    pub fn source(&self) -> MovieSource {
        match self {
            Self::Popular => MovieSource::Popular,
            Self::Search(_) => MovieSource::Search,
            Self::Genre(_) => MovieSource::Genre,
        }
    }
}
