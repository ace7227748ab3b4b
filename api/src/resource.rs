use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::handlers::resource::{
    create_resource, delete_resource, list_resources, read_resource, update_resource,
};
use crate::AppState;

/// A record type that can be served as a CRUD resource.
///
/// `Default` is used at bind time to probe the serialized shape: a bound
/// type must serialize to a JSON object so the store can hold it as a
/// document. The id accessors replace any per-type handler code; everything
/// else about the HTTP surface is derived.
pub trait Resource: Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

/// What a bound resource is served as. Created once at bind time and shared
/// read-only by every request to that resource.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    path: String,
    collection: String,
    type_name: &'static str,
}

impl ResourceDescriptor {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Registration failure. These abort startup; nothing is mounted for the
/// offending type.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("resource path {0:?} must start with '/' and not end with '/'")]
    InvalidPath(String),

    #[error("type {type_name} does not serialize to a JSON object")]
    NotAStruct { type_name: &'static str },

    #[error("resource path {0:?} is already bound")]
    DuplicatePath(String),
}

/// Explicit set of bound resources.
///
/// Each `bind` mounts the five CRUD routes for one record type. The
/// finished router is handed to the server wiring step; nothing here is
/// process-global, so two registries with different gates in front can
/// coexist on one server.
#[derive(Default)]
pub struct ResourceRegistry {
    router: Router<AppState>,
    descriptors: Vec<Arc<ResourceDescriptor>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount list/get/create/update/delete for `T` under `path`, persisting
    /// into `collection`.
    pub fn bind<T: Resource>(mut self, path: &str, collection: &str) -> Result<Self, BindError> {
        if !path.starts_with('/') || path.ends_with('/') {
            return Err(BindError::InvalidPath(path.to_string()));
        }

        let serializes_to_object = serde_json::to_value(T::default())
            .map(|value| value.is_object())
            .unwrap_or(false);
        if !serializes_to_object {
            return Err(BindError::NotAStruct {
                type_name: std::any::type_name::<T>(),
            });
        }

        if self.descriptors.iter().any(|d| d.path() == path) {
            return Err(BindError::DuplicatePath(path.to_string()));
        }

        let descriptor = Arc::new(ResourceDescriptor {
            path: path.to_string(),
            collection: collection.to_string(),
            type_name: std::any::type_name::<T>(),
        });

        let routes = Router::new()
            .route(path, get(list_resources::<T>).post(create_resource::<T>))
            .route(
                &format!("{}/:id", path),
                get(read_resource::<T>)
                    .put(update_resource::<T>)
                    .delete(delete_resource::<T>),
            )
            .layer(Extension(descriptor.clone()));

        self.router = self.router.merge(routes);
        self.descriptors.push(descriptor);
        Ok(self)
    }

    /// Descriptors for every bound resource, in bind order.
    pub fn descriptors(&self) -> &[Arc<ResourceDescriptor>] {
        &self.descriptors
    }

    pub fn into_router(self) -> Router<AppState> {
        self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Doc {
        id: String,
    }

    impl Resource for Doc {
        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    // Serializes to a JSON string, not an object.
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Bare(String);

    impl Resource for Bare {
        fn id(&self) -> &str {
            &self.0
        }

        fn set_id(&mut self, id: String) {
            self.0 = id;
        }
    }

    #[test]
    fn test_bind_rejects_non_object_types() {
        let result = ResourceRegistry::new().bind::<Bare>("/bare", "bare");
        assert!(matches!(result, Err(BindError::NotAStruct { .. })));
    }

    #[test]
    fn test_bind_rejects_bad_paths() {
        assert!(matches!(
            ResourceRegistry::new().bind::<Doc>("docs", "docs"),
            Err(BindError::InvalidPath(_))
        ));
        assert!(matches!(
            ResourceRegistry::new().bind::<Doc>("/docs/", "docs"),
            Err(BindError::InvalidPath(_))
        ));
        assert!(matches!(
            ResourceRegistry::new().bind::<Doc>("/", "docs"),
            Err(BindError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_bind_rejects_duplicate_paths() {
        let result = ResourceRegistry::new()
            .bind::<Doc>("/docs", "docs")
            .unwrap()
            .bind::<Doc>("/docs", "other");
        assert!(matches!(result, Err(BindError::DuplicatePath(_))));
    }

    #[test]
    fn test_bind_records_descriptor() {
        let registry = ResourceRegistry::new().bind::<Doc>("/docs", "docs").unwrap();

        let descriptors = registry.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].path(), "/docs");
        assert_eq!(descriptors[0].collection(), "docs");
        assert!(descriptors[0].type_name().ends_with("Doc"));
    }
}
