//! Media repository: the singleton pages (about, contact, logo, site
//! config) and the banner/carousel collections.
//!
//! Singletons are read with `LIMIT 1`; creates are refused once a row
//! exists so the tables never grow past one row.

use sqlx::PgPool;
use uuid::Uuid;

use durian_core::{BannerId, CarouselId};

use super::{Page, PageRequest, RepositoryError, like_pattern};
use crate::models::{About, Banner, Carousel, Contact, Logo, SiteConfig};

const ABOUT_COLUMNS: &str = "title, text, maps, image, img_url, updated_at";
const CONTACT_COLUMNS: &str = "company_name, description, whatsapp_number, email, address, \
     latitude, longitude, image, img_url, updated_at";
const LOGO_COLUMNS: &str = "image, img_url, updated_at";
const CONFIG_COLUMNS: &str = "theme, primary_color, secondary_color, background_color, \
     text_color, site_name, site_description, keywords, updated_at";
const BANNER_COLUMNS: &str = "id, title, text, image, img_url, created_at, updated_at";
const CAROUSEL_COLUMNS: &str = "id, title, description, image, img_url, created_at, updated_at";

/// Update payload for the about page. `image` is `None` when the
/// stored image is kept.
#[derive(Debug)]
pub struct AboutContent {
    pub title: String,
    pub text: String,
    pub maps: String,
    pub image: Option<(String, String)>,
}

/// Contact page payload. `image` is only consulted on update; creates
/// pass the freshly stored file alongside.
#[derive(Debug)]
pub struct ContactContent {
    pub company_name: String,
    pub description: String,
    pub whatsapp_number: String,
    pub email: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: Option<(String, String)>,
}

#[derive(Debug, Default)]
pub struct SiteConfigChanges {
    pub theme: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct BannerChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    pub image: Option<(String, String)>,
}

#[derive(Debug, Default)]
pub struct CarouselChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<(String, String)>,
}

pub struct MediaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MediaRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // About
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_about(&self) -> Result<Option<About>, RepositoryError> {
        let query = format!("SELECT {ABOUT_COLUMNS} FROM about LIMIT 1");
        Ok(sqlx::query_as::<_, About>(&query)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a row already exists; the
    /// page must then be changed through update.
    pub async fn create_about(
        &self,
        title: &str,
        text: &str,
        maps: &str,
        image: &str,
        img_url: &str,
    ) -> Result<About, RepositoryError> {
        if self.get_about().await?.is_some() {
            return Err(RepositoryError::Conflict(
                "About page already exists.".to_owned(),
            ));
        }
        let query = format!(
            "INSERT INTO about (id, title, text, maps, image, img_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ABOUT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, About>(&query)
            .bind(Uuid::new_v4())
            .bind(title)
            .bind(text)
            .bind(maps)
            .bind(image)
            .bind(img_url)
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row exists yet.
    pub async fn update_about(&self, content: AboutContent) -> Result<About, RepositoryError> {
        let (image, img_url) = match content.image {
            Some((image, img_url)) => (Some(image), Some(img_url)),
            None => (None, None),
        };
        let query = format!(
            "UPDATE about SET
                 title = $1, text = $2, maps = $3,
                 image = COALESCE($4, image),
                 img_url = COALESCE($5, img_url),
                 updated_at = now()
             RETURNING {ABOUT_COLUMNS}"
        );
        sqlx::query_as::<_, About>(&query)
            .bind(content.title)
            .bind(content.text)
            .bind(content.maps)
            .bind(image)
            .bind(img_url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row exists.
    pub async fn delete_about(&self) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM about")
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Contact
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_contact(&self) -> Result<Option<Contact>, RepositoryError> {
        let query = format!("SELECT {CONTACT_COLUMNS} FROM contact LIMIT 1");
        Ok(sqlx::query_as::<_, Contact>(&query)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a row already exists.
    pub async fn create_contact(
        &self,
        content: ContactContent,
        image: &str,
        img_url: &str,
    ) -> Result<Contact, RepositoryError> {
        if self.get_contact().await?.is_some() {
            return Err(RepositoryError::Conflict(
                "Contact page already exists.".to_owned(),
            ));
        }
        let query = format!(
            "INSERT INTO contact
                 (id, company_name, description, whatsapp_number, email, address,
                  latitude, longitude, image, img_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {CONTACT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Contact>(&query)
            .bind(Uuid::new_v4())
            .bind(content.company_name)
            .bind(content.description)
            .bind(content.whatsapp_number)
            .bind(content.email)
            .bind(content.address)
            .bind(content.latitude)
            .bind(content.longitude)
            .bind(image)
            .bind(img_url)
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row exists yet.
    pub async fn update_contact(
        &self,
        content: ContactContent,
    ) -> Result<Contact, RepositoryError> {
        let (image, img_url) = match content.image {
            Some((image, img_url)) => (Some(image), Some(img_url)),
            None => (None, None),
        };
        let query = format!(
            "UPDATE contact SET
                 company_name = $1, description = $2, whatsapp_number = $3,
                 email = $4, address = $5, latitude = $6, longitude = $7,
                 image = COALESCE($8, image),
                 img_url = COALESCE($9, img_url),
                 updated_at = now()
             RETURNING {CONTACT_COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(content.company_name)
            .bind(content.description)
            .bind(content.whatsapp_number)
            .bind(content.email)
            .bind(content.address)
            .bind(content.latitude)
            .bind(content.longitude)
            .bind(image)
            .bind(img_url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row exists.
    pub async fn delete_contact(&self) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM contact")
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Logo
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_logo(&self) -> Result<Option<Logo>, RepositoryError> {
        let query = format!("SELECT {LOGO_COLUMNS} FROM logo LIMIT 1");
        Ok(sqlx::query_as::<_, Logo>(&query)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a row already exists.
    pub async fn create_logo(&self, image: &str, img_url: &str) -> Result<Logo, RepositoryError> {
        if self.get_logo().await?.is_some() {
            return Err(RepositoryError::Conflict("Logo already exists.".to_owned()));
        }
        let query = format!(
            "INSERT INTO logo (id, image, img_url) VALUES ($1, $2, $3) RETURNING {LOGO_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Logo>(&query)
            .bind(Uuid::new_v4())
            .bind(image)
            .bind(img_url)
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row exists yet.
    pub async fn update_logo(&self, image: &str, img_url: &str) -> Result<Logo, RepositoryError> {
        let query = format!(
            "UPDATE logo SET image = $1, img_url = $2, updated_at = now()
             RETURNING {LOGO_COLUMNS}"
        );
        sqlx::query_as::<_, Logo>(&query)
            .bind(image)
            .bind(img_url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    // =========================================================================
    // Site configuration
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_site_config(&self) -> Result<Option<SiteConfig>, RepositoryError> {
        let query = format!("SELECT {CONFIG_COLUMNS} FROM site_config LIMIT 1");
        Ok(sqlx::query_as::<_, SiteConfig>(&query)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Partial update of the configuration row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row exists yet.
    pub async fn update_site_config(
        &self,
        changes: SiteConfigChanges,
    ) -> Result<SiteConfig, RepositoryError> {
        let query = format!(
            "UPDATE site_config SET
                 theme = COALESCE($1, theme),
                 primary_color = COALESCE($2, primary_color),
                 secondary_color = COALESCE($3, secondary_color),
                 background_color = COALESCE($4, background_color),
                 text_color = COALESCE($5, text_color),
                 site_name = COALESCE($6, site_name),
                 site_description = COALESCE($7, site_description),
                 keywords = COALESCE($8, keywords),
                 updated_at = now()
             RETURNING {CONFIG_COLUMNS}"
        );
        sqlx::query_as::<_, SiteConfig>(&query)
            .bind(changes.theme)
            .bind(changes.primary_color)
            .bind(changes.secondary_color)
            .bind(changes.background_color)
            .bind(changes.text_color)
            .bind(changes.site_name)
            .bind(changes.site_description)
            .bind(changes.keywords)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    // =========================================================================
    // Banners
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_banners(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Banner>, RepositoryError> {
        let filter = "WHERE ($1::text IS NULL OR title ILIKE $1 OR text ILIKE $1)";
        let pattern = search.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) FROM banners {filter}");
        let total_rows: i64 = sqlx::query_scalar(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let list_query = format!(
            "SELECT {BANNER_COLUMNS} FROM banners {filter}
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Banner>(&list_query)
            .bind(pattern.as_deref())
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_banner(&self, id: BannerId) -> Result<Option<Banner>, RepositoryError> {
        let query = format!("SELECT {BANNER_COLUMNS} FROM banners WHERE id = $1");
        Ok(sqlx::query_as::<_, Banner>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_banner(
        &self,
        title: &str,
        text: &str,
        image: &str,
        img_url: &str,
    ) -> Result<Banner, RepositoryError> {
        let query = format!(
            "INSERT INTO banners (id, title, text, image, img_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {BANNER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Banner>(&query)
            .bind(BannerId::generate())
            .bind(title)
            .bind(text)
            .bind(image)
            .bind(img_url)
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner does not exist.
    pub async fn update_banner(
        &self,
        id: BannerId,
        changes: BannerChanges,
    ) -> Result<Banner, RepositoryError> {
        let (image, img_url) = match changes.image {
            Some((image, img_url)) => (Some(image), Some(img_url)),
            None => (None, None),
        };
        let query = format!(
            "UPDATE banners SET
                 title = COALESCE($2, title),
                 text = COALESCE($3, text),
                 image = COALESCE($4, image),
                 img_url = COALESCE($5, img_url),
                 updated_at = now()
             WHERE id = $1
             RETURNING {BANNER_COLUMNS}"
        );
        sqlx::query_as::<_, Banner>(&query)
            .bind(id)
            .bind(changes.title)
            .bind(changes.text)
            .bind(image)
            .bind(img_url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner does not exist.
    pub async fn delete_banner(&self, id: BannerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Carousels
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_carousels(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Carousel>, RepositoryError> {
        let filter = "WHERE ($1::text IS NULL OR title ILIKE $1 OR description ILIKE $1)";
        let pattern = search.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) FROM carousels {filter}");
        let total_rows: i64 = sqlx::query_scalar(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let list_query = format!(
            "SELECT {CAROUSEL_COLUMNS} FROM carousels {filter}
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Carousel>(&list_query)
            .bind(pattern.as_deref())
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_carousel(
        &self,
        id: CarouselId,
    ) -> Result<Option<Carousel>, RepositoryError> {
        let query = format!("SELECT {CAROUSEL_COLUMNS} FROM carousels WHERE id = $1");
        Ok(sqlx::query_as::<_, Carousel>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_carousel(
        &self,
        title: &str,
        description: &str,
        image: &str,
        img_url: &str,
    ) -> Result<Carousel, RepositoryError> {
        let query = format!(
            "INSERT INTO carousels (id, title, description, image, img_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CAROUSEL_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Carousel>(&query)
            .bind(CarouselId::generate())
            .bind(title)
            .bind(description)
            .bind(image)
            .bind(img_url)
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the carousel does not
    /// exist.
    pub async fn update_carousel(
        &self,
        id: CarouselId,
        changes: CarouselChanges,
    ) -> Result<Carousel, RepositoryError> {
        let (image, img_url) = match changes.image {
            Some((image, img_url)) => (Some(image), Some(img_url)),
            None => (None, None),
        };
        let query = format!(
            "UPDATE carousels SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 image = COALESCE($4, image),
                 img_url = COALESCE($5, img_url),
                 updated_at = now()
             WHERE id = $1
             RETURNING {CAROUSEL_COLUMNS}"
        );
        sqlx::query_as::<_, Carousel>(&query)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(image)
            .bind(img_url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the carousel does not
    /// exist.
    pub async fn delete_carousel(&self, id: CarouselId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM carousels WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
