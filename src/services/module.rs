//! Module service
//!
//! Provides business logic for the module catalog: CRUD operations and
//! attaching an image to a module.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use tracing::info;

use crate::error::{AsedexError, AsedexResult};
use crate::models::{Module, ModuleId};
use crate::storage::Storage;

/// Fields needed to create a module
#[derive(Debug, Clone, Default)]
pub struct NewModule {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
}

/// Partial update of a module; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ModulePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
}

impl ModulePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
    }
}

/// Service for catalog module management
pub struct ModuleService<'a> {
    storage: &'a Storage,
}

impl<'a> ModuleService<'a> {
    /// Create a new module service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new module
    pub fn create(&self, new: NewModule) -> AsedexResult<Module> {
        let module = self.storage.modules.try_update(|modules| {
            let last = modules.iter().map(|m| m.id).max();
            let id = ModuleId::next_after(last).ok_or_else(|| AsedexError::ids_exhausted("Module"))?;
            let mut module = Module::new(
                id,
                new.title.trim(),
                new.category.trim(),
                new.price,
            );
            module.description = new.description.trim().to_string();

            module
                .validate()
                .map_err(|e| AsedexError::Validation(e.to_string()))?;

            modules.push(module.clone());
            Ok(module)
        })?;

        info!(key = "modules", operation = "create", id = %module.id, "module created");
        Ok(module)
    }

    /// Get a module by ID
    pub fn get(&self, id: ModuleId) -> AsedexResult<Option<Module>> {
        self.storage
            .modules
            .with(|modules| modules.iter().find(|m| m.id == id).cloned())
    }

    /// Find a module by ID or title (case-insensitive)
    pub fn find(&self, identifier: &str) -> AsedexResult<Option<Module>> {
        if let Ok(id) = identifier.parse::<ModuleId>() {
            if let Some(module) = self.get(id)? {
                return Ok(Some(module));
            }
        }

        let needle = identifier.trim().to_lowercase();
        self.storage.modules.with(|modules| {
            modules
                .iter()
                .find(|m| m.title.to_lowercase() == needle)
                .cloned()
        })
    }

    /// List all modules, optionally restricted to a category
    pub fn list(&self, category: Option<&str>) -> AsedexResult<Vec<Module>> {
        let mut modules = self.storage.modules.get()?;
        if let Some(category) = category {
            let category = category.trim().to_lowercase();
            modules.retain(|m| m.category.to_lowercase() == category);
        }
        Ok(modules)
    }

    /// Merge a patch into a module
    pub fn update(&self, id: ModuleId, patch: ModulePatch) -> AsedexResult<Module> {
        let module = self.storage.modules.try_update(|modules| {
            let module = modules
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| AsedexError::module_not_found(id.to_string()))?;

            let mut updated = module.clone();
            if let Some(title) = patch.title {
                updated.title = title.trim().to_string();
            }
            if let Some(description) = patch.description {
                updated.description = description.trim().to_string();
            }
            if let Some(category) = patch.category {
                updated.category = category.trim().to_string();
            }
            if let Some(price) = patch.price {
                updated.price = price;
            }

            updated
                .validate()
                .map_err(|e| AsedexError::Validation(e.to_string()))?;

            *module = updated.clone();
            Ok(updated)
        })?;

        info!(key = "modules", operation = "update", id = %module.id, "module updated");
        Ok(module)
    }

    /// Delete a module from the catalog
    ///
    /// Budgets keep their own copy of the module.
    pub fn delete(&self, id: ModuleId) -> AsedexResult<Module> {
        let removed = self.storage.modules.try_update(|modules| {
            let index = modules
                .iter()
                .position(|m| m.id == id)
                .ok_or_else(|| AsedexError::module_not_found(id.to_string()))?;
            Ok(modules.remove(index))
        })?;

        info!(key = "modules", operation = "delete", id = %removed.id, "module deleted");
        Ok(removed)
    }

    /// Attach an image file to a module
    ///
    /// The file is copied into the uploads directory under a timestamped
    /// name, and its contents are kept inline as a data URL.
    pub fn attach_image(&self, id: ModuleId, source: &Path) -> AsedexResult<Module> {
        if self.get(id)?.is_none() {
            return Err(AsedexError::module_not_found(id.to_string()));
        }

        let bytes = std::fs::read(source).map_err(|e| {
            AsedexError::Io(format!("Failed to read image {}: {}", source.display(), e))
        })?;

        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();
        let file_name = format!("{}{}", Utc::now().timestamp_millis(), extension);

        let uploads_dir = self.storage.paths().uploads_dir();
        std::fs::create_dir_all(&uploads_dir)
            .map_err(|e| AsedexError::Io(format!("Failed to create uploads directory: {}", e)))?;
        std::fs::write(uploads_dir.join(&file_name), &bytes)
            .map_err(|e| AsedexError::Io(format!("Failed to store image: {}", e)))?;

        let image_url = format!("/uploads/{}", file_name);
        let image_data = format!("data:{};base64,{}", mime_type(&extension), STANDARD.encode(&bytes));

        let module = self.storage.modules.try_update(|modules| {
            let module = modules
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| AsedexError::module_not_found(id.to_string()))?;
            module.image_url = Some(image_url);
            module.image_data = image_data;
            Ok(module.clone())
        })?;

        info!(key = "modules", operation = "attach_image", id = %module.id, "image attached");
        Ok(module)
    }
}

fn mime_type(extension: &str) -> &'static str {
    match extension {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        ".svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
