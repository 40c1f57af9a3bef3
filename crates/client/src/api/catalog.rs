//! Category and location catalogs.
//!
//! Listing without a group returns the global defaults; with a group, the
//! customizations owned by that group. The store merges the two.

use stockpile_core::{
    Category, CategoryId, CategoryInput, GroupId, Location, LocationId, LocationInput,
};
use tracing::{debug, instrument};

use super::ApiClient;
use super::types::{
    CategoriesEnvelope, CategoryEnvelope, DeletedCategoryEnvelope, DeletedLocationEnvelope,
    LocationEnvelope, LocationsEnvelope,
};
use crate::pipeline::{ApiError, RequestSpec};

impl ApiClient {
    /// List categories, either defaults (`None`) or a group's own.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        group_id: Option<&GroupId>,
    ) -> Result<Vec<Category>, ApiError> {
        let spec = RequestSpec::get("categories").group_scope(group_id);
        let envelope: CategoriesEnvelope = self.pipeline().execute(spec).await?;
        debug!(count = envelope.categories.len(), "Fetched categories");
        Ok(envelope.categories)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let spec = RequestSpec::post("categories").json(input)?;
        let envelope: CategoryEnvelope = self.pipeline().execute(spec).await?;
        Ok(envelope.category)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let spec = RequestSpec::put("categories")
            .segment(id.as_str())
            .json(input)?;
        let envelope: CategoryEnvelope = self.pipeline().execute(spec).await?;
        Ok(envelope.category)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<Option<Category>, ApiError> {
        let spec = RequestSpec::delete("categories").segment(id.as_str());
        let envelope: Option<DeletedCategoryEnvelope> = self.pipeline().execute(spec).await?;
        Ok(envelope.and_then(|e| e.category))
    }

    /// List locations, either defaults (`None`) or a group's own.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_locations(
        &self,
        group_id: Option<&GroupId>,
    ) -> Result<Vec<Location>, ApiError> {
        let spec = RequestSpec::get("locations").group_scope(group_id);
        let envelope: LocationsEnvelope = self.pipeline().execute(spec).await?;
        debug!(count = envelope.locations.len(), "Fetched locations");
        Ok(envelope.locations)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_location(&self, input: &LocationInput) -> Result<Location, ApiError> {
        let spec = RequestSpec::post("locations").json(input)?;
        let envelope: LocationEnvelope = self.pipeline().execute(spec).await?;
        Ok(envelope.location)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(location_id = %id))]
    pub async fn update_location(
        &self,
        id: &LocationId,
        input: &LocationInput,
    ) -> Result<Location, ApiError> {
        let spec = RequestSpec::put("locations")
            .segment(id.as_str())
            .json(input)?;
        let envelope: LocationEnvelope = self.pipeline().execute(spec).await?;
        Ok(envelope.location)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self), fields(location_id = %id))]
    pub async fn delete_location(&self, id: &LocationId) -> Result<Option<Location>, ApiError> {
        let spec = RequestSpec::delete("locations").segment(id.as_str());
        let envelope: Option<DeletedLocationEnvelope> = self.pipeline().execute(spec).await?;
        Ok(envelope.and_then(|e| e.location))
    }
}
