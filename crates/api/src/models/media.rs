//! Media and site-content models: singleton pages (about, contact, logo,
//! site configuration) and the banner/carousel collections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use durian_core::{BannerId, CarouselId};

/// The single "about us" page. At most one row exists.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct About {
    pub title: String,
    pub text: String,
    pub maps: String,
    pub image: String,
    #[serde(rename = "imgUrl")]
    pub img_url: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// The single contact page. At most one row exists.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Contact {
    #[serde(rename = "companyName")]
    pub company_name: String,
    pub description: String,
    #[serde(rename = "whatsappNumber")]
    pub whatsapp_number: String,
    pub email: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: String,
    #[serde(rename = "imgUrl")]
    pub img_url: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// The single site logo. At most one row exists.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Logo {
    pub image: String,
    #[serde(rename = "imgUrl")]
    pub img_url: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Site-wide presentation settings. At most one row exists.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SiteConfig {
    pub theme: String,
    #[serde(rename = "primaryColor")]
    pub primary_color: Option<String>,
    #[serde(rename = "secondaryColor")]
    pub secondary_color: Option<String>,
    #[serde(rename = "backgroundColor")]
    pub background_color: Option<String>,
    #[serde(rename = "textColor")]
    pub text_color: Option<String>,
    #[serde(rename = "siteName")]
    pub site_name: Option<String>,
    #[serde(rename = "siteDescription")]
    pub site_description: Option<String>,
    pub keywords: Vec<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A promotional banner.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub text: String,
    pub image: String,
    #[serde(rename = "imgUrl")]
    pub img_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A homepage carousel slide.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Carousel {
    pub id: CarouselId,
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "imgUrl")]
    pub img_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
