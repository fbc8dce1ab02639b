// src/db/fixtures.rs

// Linhas de apoio para os testes com banco (#[sqlx::test]).

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{ClientRepository, LotRepository, ProductRepository, UserRepository},
    models::{
        clients::{Client, ClientPayload},
        lots::{Lot, LotPayload},
        products::{Product, ProductPayload},
    },
};

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub async fn user(pool: &PgPool, email: &str) -> Uuid {
    UserRepository::new(pool.clone())
        .create_user(pool, email, "$2b$04$hash-de-teste")
        .await
        .unwrap()
        .id
}

pub fn client_payload(name: &str) -> ClientPayload {
    ClientPayload {
        name: name.into(),
        company: format!("{} S.A.", name),
        establishment: Some("La Esperanza".into()),
        contact: None,
        email: Some("campo@agro.com".into()),
        address: None,
    }
}

pub async fn client(pool: &PgPool, user_id: Uuid, name: &str) -> Client {
    ClientRepository::new()
        .create_client(pool, user_id, &client_payload(name))
        .await
        .unwrap()
}

pub fn lot_payload(name: &str, area: &str) -> LotPayload {
    LotPayload {
        name: name.into(),
        area_ha: Some(dec(area)),
        latitude: Some(-33.1234),
        longitude: None,
        crop: Some("Soja".into()),
        comments: None,
    }
}

pub async fn lot(pool: &PgPool, user_id: Uuid, client_id: Uuid, name: &str, area: &str) -> Lot {
    LotRepository::new()
        .create_lot(pool, user_id, client_id, &lot_payload(name, area))
        .await
        .unwrap()
        .unwrap()
}

pub fn product_payload(name: &str, unit: Option<&str>) -> ProductPayload {
    ProductPayload {
        name: name.into(),
        brand: None,
        composition: Some(format!("{} 62%", name)),
        product_type: Some("Herbicida".into()),
        unit: unit.map(str::to_string),
    }
}

pub async fn product(pool: &PgPool, user_id: Uuid, name: &str, unit: &str) -> Product {
    ProductRepository::new()
        .create_product(pool, user_id, &product_payload(name, Some(unit)))
        .await
        .unwrap()
}
