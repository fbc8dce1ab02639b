// src/services/recipe_builder.rs

// Montador da receita: cliente -> lotes -> produtos com dose.
// Tudo em memória; o RecipeService carrega as linhas do banco, monta e grava.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::numeric::NumericColumn,
    models::{lots::Lot, products::Product},
};

// recipe_products.dose_per_ha e recipe_products.total_dose
const DOSE_COLUMN: NumericColumn = NumericColumn::new(14, 4);
const TOTAL_COLUMN: NumericColumn = NumericColumn::new(16, 4);

// A ordem das variantes segue a ordem das verificações em `validate`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("nenhum cliente selecionado")]
    MissingClient,
    #[error("nenhum lote selecionado")]
    NoLots,
    #[error("nenhum produto adicionado")]
    NoProducts,
    #[error("dose ausente ou inválida para o produto {0}")]
    InvalidDose(Uuid),
    #[error("produto {0} já está na receita")]
    DuplicateProduct(Uuid),
    #[error("produto {0} está arquivado")]
    ArchivedProduct(Uuid),
    #[error("lote {0} não pertence ao cliente selecionado")]
    LotNotOfClient(Uuid),
}

impl DraftError {
    pub fn code(&self) -> &'static str {
        match self {
            DraftError::MissingClient => "missing_client",
            DraftError::NoLots => "no_lots",
            DraftError::NoProducts => "no_products",
            DraftError::InvalidDose(_) => "invalid_dose",
            DraftError::DuplicateProduct(_) => "duplicate_product",
            DraftError::ArchivedProduct(_) => "archived_product",
            DraftError::LotNotOfClient(_) => "lot_not_of_client",
        }
    }

    /// O registro que causou o erro, quando há um.
    pub fn subject(&self) -> Option<Uuid> {
        match self {
            DraftError::InvalidDose(id)
            | DraftError::DuplicateProduct(id)
            | DraftError::ArchivedProduct(id)
            | DraftError::LotNotOfClient(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftLot {
    pub lot_id: Uuid,
    pub name: String,
    #[schema(value_type = f64)]
    pub area_ha: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftProduct {
    pub product_id: Uuid,
    pub name: String,
    pub unit: String,
    pub dose_per_ha: Option<Decimal>,
}

/// Linha de produto pronta para gravar em recipe_products.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub mix_order: i32,
    #[schema(value_type = f64)]
    pub dose_per_ha: Decimal,
    pub dose_unit: String,
    #[schema(value_type = f64)]
    pub total_dose: Decimal,
    pub total_unit: String,
}

/// O que a pré-visualização devolve: a receita calculada, sem gravar.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipePreview {
    pub client_id: Uuid,
    #[schema(value_type = f64)]
    pub total_area_ha: Decimal,
    pub lots: Vec<DraftLot>,
    pub lines: Vec<RecipeLine>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    client_id: Option<Uuid>,
    lots: Vec<DraftLot>,
    products: Vec<DraftProduct>,
}

impl RecipeDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_id(&self) -> Option<Uuid> {
        self.client_id
    }

    pub fn lots(&self) -> &[DraftLot] {
        &self.lots
    }

    pub fn products(&self) -> &[DraftProduct] {
        &self.products
    }

    /// Trocar de cliente descarta os lotes do anterior.
    pub fn select_client(&mut self, client_id: Uuid) {
        if self.client_id != Some(client_id) {
            self.lots.clear();
        }
        self.client_id = Some(client_id);
    }

    /// Marca ou desmarca o lote. Devolve `true` se ele ficou selecionado.
    pub fn toggle_lot(&mut self, lot: &Lot) -> Result<bool, DraftError> {
        let client_id = self.client_id.ok_or(DraftError::MissingClient)?;
        if lot.client_id != client_id {
            return Err(DraftError::LotNotOfClient(lot.id));
        }

        if let Some(pos) = self.lots.iter().position(|l| l.lot_id == lot.id) {
            self.lots.remove(pos);
            return Ok(false);
        }

        self.lots.push(DraftLot {
            lot_id: lot.id,
            name: lot.name.clone(),
            area_ha: lot.area_ha,
        });
        Ok(true)
    }

    /// Soma das superfícies dos lotes selecionados.
    pub fn selected_area(&self) -> Decimal {
        self.lots.iter().map(|l| l.area_ha).sum()
    }

    pub fn add_product(&mut self, product: &Product) -> Result<(), DraftError> {
        if !product.active {
            return Err(DraftError::ArchivedProduct(product.id));
        }
        if self.products.iter().any(|p| p.product_id == product.id) {
            return Err(DraftError::DuplicateProduct(product.id));
        }

        self.products.push(DraftProduct {
            product_id: product.id,
            name: product.name.clone(),
            unit: product.unit.clone(),
            dose_per_ha: None,
        });
        Ok(())
    }

    /// Devolve `false` se o produto não está na receita.
    pub fn set_dose(&mut self, product_id: Uuid, dose_per_ha: Option<Decimal>) -> bool {
        match self.products.iter_mut().find(|p| p.product_id == product_id) {
            Some(p) => {
                p.dose_per_ha = dose_per_ha;
                true
            }
            None => false,
        }
    }

    pub fn remove_product(&mut self, product_id: Uuid) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.product_id != product_id);
        self.products.len() != before
    }

    /// dose/ha × superfície selecionada. `None` se não couber na coluna do total.
    pub fn line_total(&self, dose_per_ha: Decimal) -> Option<Decimal> {
        dose_per_ha
            .checked_mul(self.selected_area())
            .map(|total| total.round_dp(TOTAL_COLUMN.scale))
            .filter(|total| TOTAL_COLUMN.fits(*total))
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.client_id.is_none() {
            return Err(DraftError::MissingClient);
        }
        if self.lots.is_empty() {
            return Err(DraftError::NoLots);
        }
        if self.products.is_empty() {
            return Err(DraftError::NoProducts);
        }
        for p in &self.products {
            // Dose positiva, que caiba na coluna e cujo total também caiba
            let valid = p.dose_per_ha.is_some_and(|dose| {
                dose > Decimal::ZERO && DOSE_COLUMN.fits(dose) && self.line_total(dose).is_some()
            });
            if !valid {
                return Err(DraftError::InvalidDose(p.product_id));
            }
        }
        Ok(())
    }

    /// Valida e calcula as linhas de produto, na ordem de mistura.
    pub fn lines(&self) -> Result<Vec<RecipeLine>, DraftError> {
        self.validate()?;

        self.products
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let dose = p.dose_per_ha.ok_or(DraftError::InvalidDose(p.product_id))?;
                let total = self
                    .line_total(dose)
                    .ok_or(DraftError::InvalidDose(p.product_id))?;

                Ok(RecipeLine {
                    product_id: p.product_id,
                    product_name: p.name.clone(),
                    mix_order: index as i32 + 1,
                    dose_per_ha: dose,
                    dose_unit: format!("{}/ha", p.unit),
                    total_dose: total,
                    total_unit: p.unit.clone(),
                })
            })
            .collect()
    }

    pub fn preview(&self) -> Result<RecipePreview, DraftError> {
        let lines = self.lines()?;
        Ok(RecipePreview {
            client_id: self.client_id.ok_or(DraftError::MissingClient)?,
            total_area_ha: self.selected_area(),
            lots: self.lots.clone(),
            lines,
        })
    }
}
