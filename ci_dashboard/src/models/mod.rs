//! Dashboard data models: repositories, their builds, and the flash animation state.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod build;
pub mod flash;
pub mod repository;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(RepositoryId);
id_newtype!(BuildId);
