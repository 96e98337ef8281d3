use axum::{extract::State, Json};
use chrono::{Datelike, Utc};
use serde::Serialize;

use super::AppState;
use crate::navigation::whatsapp_support_link;

pub const BRAND: &str = "BundlePay";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterView {
    pub brand: String,
    pub year: i32,
    pub copyright: String,
    pub support_url: String,
    pub links: Vec<FooterLink>,
}

#[derive(Debug, Serialize)]
pub struct FooterLink {
    pub label: String,
    pub href: String,
}

impl FooterView {
    pub fn new(year: i32, support_number: &str) -> Self {
        let link = |label: &str, href: &str| FooterLink {
            label: label.to_string(),
            href: href.to_string(),
        };

        Self {
            brand: BRAND.to_string(),
            year,
            copyright: format!("© {} {}. All rights reserved.", year, BRAND),
            support_url: whatsapp_support_link(support_number, None).path(),
            links: vec![
                link("Terms of Service", "/terms"),
                link("Privacy Policy", "/privacy"),
            ],
        }
    }
}

pub async fn footer(State(state): State<AppState>) -> Json<FooterView> {
    Json(FooterView::new(
        Utc::now().year(),
        &state.config.verification.support_whatsapp,
    ))
}
