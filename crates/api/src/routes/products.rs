//! Product routes.
//!
//! Products mirror the post workflow with one extra concern: a
//! URL-friendly slug derived from the title, kept unique by suffixing
//! a counter when the base is taken.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
};
use durian_core::{CategoryId, ProductId, TagId, UserId};

use crate::db::{
    CategoryRepository, NewProduct, Page, ProductChanges, ProductRepository, TagRepository,
    UserRepository,
};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{AuthorView, CategoryRef, Product, ProductDetail, TagRef};
use crate::services::{ImageStore, ItemKind, ReferenceService, UploadKind, ValidatedUpload};
use crate::state::AppState;

use super::forms::{FormData, parse_id, parse_ids};
use super::{ListQuery, list_response, message_response};

pub(super) async fn hydrate(
    state: &AppState,
    products: Vec<Product>,
) -> Result<Vec<ProductDetail>, AppError> {
    let author_ids: Vec<UserId> = products.iter().map(|p| p.author_id).collect();
    let category_ids: Vec<CategoryId> = products.iter().map(|p| p.category_id).collect();
    let tag_ids: Vec<TagId> = products.iter().flat_map(|p| p.tag_ids.clone()).collect();

    let authors: HashMap<UserId, AuthorView> = UserRepository::new(state.pool())
        .find_many(&author_ids)
        .await?
        .iter()
        .map(|user| (user.id, AuthorView::from(user)))
        .collect();
    let categories: HashMap<CategoryId, CategoryRef> = CategoryRepository::new(state.pool())
        .find_many(&category_ids)
        .await?
        .iter()
        .map(|category| (category.id, CategoryRef::from(category)))
        .collect();
    let tags: HashMap<TagId, TagRef> = TagRepository::new(state.pool())
        .find_many(&tag_ids)
        .await?
        .iter()
        .map(|tag| (tag.id, TagRef::from(tag)))
        .collect();

    Ok(products
        .into_iter()
        .map(|product| {
            let author = authors.get(&product.author_id).cloned();
            let category = categories.get(&product.category_id).cloned();
            let product_tags = product
                .tag_ids
                .iter()
                .filter_map(|id| tags.get(id).cloned())
                .collect();
            ProductDetail::assemble(product, author, category, product_tags)
        })
        .collect())
}

async fn hydrate_page(
    state: &AppState,
    page: Page<Product>,
) -> Result<Page<ProductDetail>, AppError> {
    let Page {
        rows,
        page,
        total_rows,
        total_pages,
    } = page;
    Ok(Page {
        rows: hydrate(state, rows).await?,
        page,
        total_rows,
        total_pages,
    })
}

/// GET /products
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let repo = ProductRepository::new(state.pool());
    let page = repo.list(query.search(), query.page_request(10)).await?;
    let page = hydrate_page(&state, page).await?;
    Ok(list_response(page, "No found product."))
}

/// GET /products/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>, AppError> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;
    let mut details = hydrate(&state, vec![product]).await?;
    Ok(Json(details.remove(0)))
}

/// GET /products/slug/{slug}
///
/// # Errors
///
/// Returns 404 for an unknown slug.
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>, AppError> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found.".to_owned()))?;
    let mut details = hydrate(&state, vec![product]).await?;
    Ok(Json(details.remove(0)))
}

/// Create a product from a multipart form (title, description,
/// category, tags[], file).
///
/// POST /products (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown category or tag,
/// 422 for a rejected image.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title", "Title is required.")?;
    let description = form.require("description", "Description is required.")?;
    let category_id: CategoryId = parse_id(
        form.require("category", "Category is required.")?,
        "Category id is not valid.",
    )?;
    let tag_ids: Vec<TagId> = parse_ids(&form.values("tags"), "Tag id is not valid.")?;

    let repo = ProductRepository::new(state.pool());
    let author = UserRepository::new(state.pool())
        .find_by_username(&claims.username)
        .await?
        .ok_or_else(|| AppError::Forbidden("Forbidden.".to_owned()))?;

    let file = form
        .file()
        .ok_or_else(|| AppError::Validation("No file uploaded.".to_owned()))?;
    let upload = ValidatedUpload::new(
        UploadKind::Product,
        &file.name,
        file.data.clone(),
        Some(&author.id.to_string()),
    )?;
    let image = state.images().save(UploadKind::Product, &upload).await?;
    let img_url = ImageStore::public_url(
        &state.config().public_base_url,
        UploadKind::Product,
        &image,
    );

    let slug = repo.unique_slug(title, None).await?;

    let new_product = NewProduct {
        title: title.to_owned(),
        slug,
        description: description.to_owned(),
        image: image.clone(),
        img_url,
        author_id: author.id,
        category_id,
        tag_ids,
    };
    if let Err(error) = persist_new_product(&state, new_product).await {
        // The image was written before the transaction; don't leave it
        // orphaned when the insert rolls back.
        if let Err(cleanup) = state.images().remove(UploadKind::Product, &image).await {
            tracing::warn!(%cleanup, %image, "Failed to remove upload after rejected product");
        }
        return Err(error);
    }

    Ok(message_response(
        StatusCode::CREATED,
        "Product created successfully.",
    ))
}

/// Inserts the product and its reference rows in one transaction.
async fn persist_new_product(state: &AppState, new_product: NewProduct) -> Result<(), AppError> {
    let category_id = new_product.category_id;
    let tag_ids = new_product.tag_ids.clone();

    let mut tx = state.pool().begin().await?;
    ReferenceService::ensure_category(&mut tx, category_id).await?;
    ReferenceService::ensure_tags(&mut tx, &tag_ids).await?;
    let product = ProductRepository::insert(&mut tx, new_product).await?;
    ReferenceService::attach(
        &mut tx,
        ItemKind::Product,
        product.id.as_uuid(),
        category_id,
        &tag_ids,
    )
    .await?;
    tx.commit().await?;
    Ok(())
}

/// Update a product. A changed title recomputes the slug; omitting the
/// file or `tags` keeps the stored value.
///
/// PATCH /products/{id} (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for unknown product/category/tag,
/// 422 for a rejected image.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title", "Title is required.")?;
    let description = form.require("description", "Description is required.")?;
    let category_id: CategoryId = parse_id(
        form.require("category", "Category is required.")?,
        "Category id is not valid.",
    )?;
    let tag_ids: Option<Vec<TagId>> = if form.has_field("tags") {
        Some(parse_ids(&form.values("tags"), "Tag id is not valid.")?)
    } else {
        None
    };

    let repo = ProductRepository::new(state.pool());
    let product = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;

    let slug = if title == product.title {
        None
    } else {
        Some(repo.unique_slug(title, Some(id)).await?)
    };

    let image = match form.file() {
        Some(file) => {
            let upload = ValidatedUpload::new(
                UploadKind::Product,
                &file.name,
                file.data.clone(),
                Some(&product.author_id.to_string()),
            )?;
            let name = state.images().save(UploadKind::Product, &upload).await?;
            let url = ImageStore::public_url(
                &state.config().public_base_url,
                UploadKind::Product,
                &name,
            );
            Some((name, url))
        }
        None => None,
    };

    let mut tx = state.pool().begin().await?;
    ReferenceService::ensure_category(&mut tx, category_id).await?;
    if let Some(new_tags) = &tag_ids {
        ReferenceService::ensure_tags(&mut tx, new_tags).await?;
        ReferenceService::sync_tags(
            &mut tx,
            ItemKind::Product,
            product.id.as_uuid(),
            &product.tag_ids,
            new_tags,
        )
        .await?;
    }
    ReferenceService::move_category(
        &mut tx,
        ItemKind::Product,
        product.id.as_uuid(),
        product.category_id,
        category_id,
    )
    .await?;
    ProductRepository::update(
        &mut tx,
        id,
        ProductChanges {
            title: Some(title.to_owned()),
            slug,
            description: Some(description.to_owned()),
            image: image.clone(),
            category_id: Some(category_id),
            tag_ids,
        },
    )
    .await?;
    tx.commit().await?;

    if image.is_some() {
        state
            .images()
            .remove(UploadKind::Product, &product.image)
            .await?;
    }

    Ok(message_response(
        StatusCode::OK,
        "Product updated successfully.",
    ))
}

/// DELETE /products/{id} (requires auth)
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    let product = ProductRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;

    let mut tx = state.pool().begin().await?;
    ReferenceService::detach(
        &mut tx,
        ItemKind::Product,
        product.id.as_uuid(),
        product.category_id,
        &product.tag_ids,
    )
    .await?;
    ProductRepository::delete(&mut tx, id).await?;
    tx.commit().await?;

    state
        .images()
        .remove(UploadKind::Product, &product.image)
        .await?;

    Ok(message_response(
        StatusCode::OK,
        "Product deleted successfully.",
    ))
}
