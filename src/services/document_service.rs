// src/services/document_service.rs

use std::path::PathBuf;

use chrono::{DateTime, Duration, FixedOffset};
use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;

use crate::{common::error::AppError, models::recipes::RecipeDetail};

// Família esperada em FONTS_DIR: DejaVuSans-Regular.ttf, DejaVuSans-Bold.ttf, ...
const FONT_FAMILY: &str = "DejaVuSans";
// Dias de validade contados a partir da aplicação
const VALIDITY_DAYS: i64 = 7;
const NO_COMMENTS: &str = "Sin comentarios adicionales.";

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
        }
    }

    pub fn render_html(&self, detail: &RecipeDetail, now: DateTime<FixedOffset>) -> String {
        render_recipe_html(detail, now)
    }

    pub fn render_pdf(
        &self,
        detail: &RecipeDetail,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<u8>, AppError> {
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_FAMILY, None)
            .map_err(|e| {
                AppError::FontNotFound(format!(
                    "Fonte {} não encontrada em {}: {}",
                    FONT_FAMILY,
                    self.fonts_dir.display(),
                    e
                ))
            })?;

        let header = &detail.header;
        let dates = DocumentDates::new(detail, now);

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Receta N° {}", header.recipe_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new("APLICAR | AGRORECETA")
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(
            elements::Paragraph::new("RECETA FITOSANITARIA")
                .styled(style::Style::new().bold().with_font_size(11)),
        );
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!(
                "RECETA N° {}   [{}]",
                header.recipe_number,
                header.status.label().to_uppercase()
            ))
            .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Emisión: {}   Aplicación: {}   Vencimiento: {}",
            dates.emitted, dates.application, dates.expiry
        )));
        doc.push(elements::Paragraph::new(format!(
            "TIPO DE APLICACIÓN: {}",
            header.application_type.label().to_uppercase()
        )));
        doc.push(elements::Break::new(1));

        // --- DADOS ---
        doc.push(elements::Paragraph::new(format!("ASESOR TÉCNICO: {}", header.technical_advisor)));
        doc.push(elements::Paragraph::new(format!("EMPRESA: {}", detail.client.company)));
        doc.push(elements::Paragraph::new(format!(
            "ESTABLECIMIENTO: {}",
            or_dash(detail.client.establishment.as_deref())
        )));
        doc.push(elements::Paragraph::new(format!(
            "DIAGNÓSTICO: {}",
            or_dash(header.diagnosis.as_deref())
        )));
        doc.push(elements::Break::new(1.5));

        let style_bold = style::Style::new().bold();

        // --- LOTES ---
        doc.push(elements::Paragraph::new("LOTES A TRATAR").styled(style_bold));
        let mut lots = elements::TableLayout::new(vec![3, 2, 2, 2, 2]);
        lots.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        lots.row()
            .element(elements::Paragraph::new("Lote").styled(style_bold))
            .element(elements::Paragraph::new("Sup. [ha]").styled(style_bold))
            .element(elements::Paragraph::new("A aplicar [ha]").styled(style_bold))
            .element(elements::Paragraph::new("Latitud").styled(style_bold))
            .element(elements::Paragraph::new("Longitud").styled(style_bold))
            .push()
            .map_err(pdf_error)?;
        for lot in &detail.lots {
            lots.row()
                .element(elements::Paragraph::new(lot.lot_name.clone()))
                .element(elements::Paragraph::new(format!("{:.2}", lot.lot_area_ha)))
                .element(elements::Paragraph::new(format!("{:.2}", lot.applied_area_ha)))
                .element(elements::Paragraph::new(coordinate(lot.latitude)))
                .element(elements::Paragraph::new(coordinate(lot.longitude)))
                .push()
                .map_err(pdf_error)?;
        }
        doc.push(lots);

        let mut total = elements::Paragraph::new(format!(
            "Total a aplicar: {:.2} ha",
            detail.total_area_ha
        ));
        total.set_alignment(genpdf::Alignment::Right);
        doc.push(total.styled(style_bold));
        doc.push(elements::Break::new(1.5));

        // --- PRODUTOS ---
        doc.push(elements::Paragraph::new("PRODUCTOS A SER APLICADOS").styled(style_bold));
        let mut products = elements::TableLayout::new(vec![1, 4, 2, 2, 1]);
        products.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        products
            .row()
            .element(elements::Paragraph::new("Orden").styled(style_bold))
            .element(elements::Paragraph::new("Producto").styled(style_bold))
            .element(elements::Paragraph::new("Dosis").styled(style_bold))
            .element(elements::Paragraph::new("Dosis total").styled(style_bold))
            .element(elements::Paragraph::new("Rem.").styled(style_bold))
            .push()
            .map_err(pdf_error)?;
        for p in &detail.products {
            let name = match p.composition.as_deref() {
                Some(c) => format!("{} ({})", p.product_name, c),
                None => p.product_name.clone(),
            };
            products
                .row()
                .element(elements::Paragraph::new(p.mix_order.to_string()))
                .element(elements::Paragraph::new(name))
                .element(elements::Paragraph::new(format!(
                    "{} {}",
                    quantity(p.dose_per_ha),
                    p.dose_unit
                )))
                .element(elements::Paragraph::new(format!(
                    "{} {}",
                    quantity(p.total_dose),
                    p.total_unit
                )))
                .element(elements::Paragraph::new("0"))
                .push()
                .map_err(pdf_error)?;
        }
        doc.push(products);
        doc.push(elements::Break::new(1.5));

        // --- COMENTÁRIOS ---
        doc.push(elements::Paragraph::new("COMENTARIOS / OBSERVACIONES").styled(style_bold));
        doc.push(elements::Paragraph::new(
            header.comments.clone().unwrap_or_else(|| NO_COMMENTS.to_string()),
        ));
        doc.push(elements::Break::new(2));

        // --- QR: identifica a receita ---
        let code = QrCode::new(qr_payload(detail).as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let pdf_image = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(image_buffer))
            .map_err(pdf_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(pdf_image);

        doc.push(
            elements::Paragraph::new("Generado automáticamente por AgroReceta App")
                .styled(style::Style::new().italic().with_font_size(8)),
        );

        // Renderiza em memória
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        Ok(buffer)
    }
}

fn pdf_error(e: genpdf::error::Error) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

fn qr_payload(detail: &RecipeDetail) -> String {
    format!("AGRORECETA|{}|{}", detail.header.recipe_number, detail.header.id)
}

struct DocumentDates {
    emitted: String,
    application: String,
    expiry: String,
}

impl DocumentDates {
    // A aplicação é o dia em que o documento é gerado. As três datas usam o fuso de `now`.
    fn new(detail: &RecipeDetail, now: DateTime<FixedOffset>) -> Self {
        let today = now.date_naive();
        let emitted = detail.header.emitted_at.with_timezone(now.offset());
        Self {
            emitted: emitted.format("%d/%m/%Y").to_string(),
            application: today.format("%d/%m/%Y").to_string(),
            expiry: (today + Duration::days(VALIDITY_DAYS)).format("%d/%m/%Y").to_string(),
        }
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

fn coordinate(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

// 2.5000 -> 2.5
fn quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Escape simples de HTML
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Documento HTML da receita. Todo valor vindo do banco passa por escape.
pub fn render_recipe_html(detail: &RecipeDetail, now: DateTime<FixedOffset>) -> String {
    let header = &detail.header;
    let dates = DocumentDates::new(detail, now);

    let lots_html: String = detail
        .lots
        .iter()
        .map(|lot| {
            format!(
                r#"<tr>
                    <td style="text-align: center;">{}</td>
                    <td style="text-align: center;">{:.2}</td>
                    <td style="text-align: center;">{:.2}</td>
                    <td style="text-align: center;">{}</td>
                    <td style="text-align: center;">{}</td>
                </tr>"#,
                html_escape(&lot.lot_name),
                lot.lot_area_ha,
                lot.applied_area_ha,
                coordinate(lot.latitude),
                coordinate(lot.longitude),
            )
        })
        .collect();

    let products_html: String = detail
        .products
        .iter()
        .map(|p| {
            format!(
                r#"<tr>
                    <td style="text-align: center;">{}</td>
                    <td>
                        <b>{}</b><br/>
                        <span style="font-size: 10px; color: #666;">{}</span>
                    </td>
                    <td style="text-align: center;">{} {}</td>
                    <td style="text-align: center;">{} {}</td>
                    <td style="text-align: center;">0</td>
                </tr>"#,
                p.mix_order,
                html_escape(&p.product_name),
                html_escape(p.composition.as_deref().unwrap_or_default()),
                quantity(p.dose_per_ha),
                html_escape(&p.dose_unit),
                quantity(p.total_dose),
                html_escape(&p.total_unit),
            )
        })
        .collect();

    let comments = header
        .comments
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(html_escape)
        .unwrap_or_else(|| NO_COMMENTS.to_string());

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Receta N° {number}</title>
    <style>
        body {{ font-family: 'Helvetica', sans-serif; padding: 20px; color: #333; }}
        .header {{ display: flex; justify-content: space-between; align-items: center; border-bottom: 2px solid #4caf50; padding-bottom: 10px; margin-bottom: 20px; }}
        .logo {{ font-size: 24px; font-weight: bold; }}
        .logo span {{ color: #4caf50; }}
        .title-box {{ text-align: center; margin-bottom: 30px; }}
        .recipe-number {{ font-size: 22px; font-weight: bold; margin-bottom: 10px; }}
        .dates {{ display: flex; justify-content: space-around; font-size: 12px; margin-bottom: 15px; }}
        .dates strong {{ display: block; margin-bottom: 5px; font-style: italic; }}
        .section-title {{ font-size: 12px; font-weight: bold; margin-top: 15px; margin-bottom: 5px; color: #555; }}
        .info-block {{ font-size: 12px; line-height: 1.6; margin-bottom: 20px; }}
        table {{ width: 100%; border-collapse: collapse; margin-bottom: 20px; font-size: 11px; }}
        th {{ background-color: #f0f0f0; padding: 8px; text-align: center; border: 1px solid #ddd; }}
        td {{ padding: 8px; border: 1px solid #ddd; }}
        .status {{ float: right; color: #4caf50; font-weight: bold; border: 1px solid #4caf50; padding: 2px 8px; border-radius: 4px; font-size: 10px; }}
    </style>
</head>
<body>
    <div class="header">
        <div class="logo">APLICAR | <span>AGRORECETA</span></div>
        <div style="color: #0288d1; font-weight: bold;">RECETA FITOSANITARIA</div>
    </div>

    <div class="title-box">
        <div class="status">[{status}]</div>
        <div class="recipe-number">RECETA N° {number}</div>
        <div class="dates">
            <div><strong>FECHA DE EMISIÓN</strong>{emitted}</div>
            <div><strong>FECHA DE APLICACIÓN</strong><span style="color: #0288d1;">{application}</span></div>
            <div><strong>FECHA DE VENCIMIENTO</strong><span style="color: #d32f2f;">{expiry}</span></div>
        </div>
        <div style="border-top: 1px solid #ddd; border-bottom: 1px solid #ddd; padding: 5px; font-size: 12px;">
            TIPO DE APLICACIÓN: <strong style="color: #d32f2f;">{application_type}</strong>
        </div>
    </div>

    <div class="info-block">
        <b>ASESOR TÉCNICO:</b> {advisor}<br/><br/>
        <b>EMPRESA:</b> {company}<br/>
        <b>ESTABLECIMIENTO:</b> {establishment}<br/>
        <b>DIAGNÓSTICO:</b> {diagnosis}
    </div>

    <div class="section-title">LOTES A TRATAR</div>
    <table>
        <thead>
            <tr>
                <th>NOMBRE LOTE</th>
                <th>SUPERFICIE [ha]</th>
                <th>SUPERFICIE A APLICAR [ha]</th>
                <th>LATITUD</th>
                <th>LONGITUD</th>
            </tr>
        </thead>
        <tbody>
            {lots}
        </tbody>
    </table>
    <div style="text-align: right; font-size: 11px;">
        <strong>Total a aplicar: {total:.2} ha</strong>
    </div>

    <div class="section-title">PRODUCTOS A SER APLICADOS</div>
    <table>
        <thead>
            <tr>
                <th>ORDEN</th>
                <th>PRODUCTO</th>
                <th>DOSIS</th>
                <th>DOSIS TOTAL</th>
                <th>REMANENTE</th>
            </tr>
        </thead>
        <tbody>
            {products}
        </tbody>
    </table>

    <div class="section-title">COMENTARIOS / OBSERVACIONES</div>
    <div style="border: 1px solid #ddd; padding: 10px; font-size: 12px; min-height: 50px;">
        {comments}
    </div>

    <div style="margin-top: 30px; text-align: center; font-size: 10px; color: #999;">
        Generado automáticamente por AgroReceta App
    </div>
</body>
</html>
"#,
        number = header.recipe_number,
        status = header.status.label().to_uppercase(),
        emitted = dates.emitted,
        application = dates.application,
        expiry = dates.expiry,
        application_type = header.application_type.label().to_uppercase(),
        advisor = html_escape(&header.technical_advisor),
        company = html_escape(&detail.client.company),
        establishment = html_escape(or_dash(detail.client.establishment.as_deref())),
        diagnosis = html_escape(or_dash(header.diagnosis.as_deref())),
        lots = lots_html,
        total = detail.total_area_ha,
        products = products_html,
        comments = comments,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::models::{
        clients::Client,
        recipes::{
            ApplicationType, Recipe, RecipeLotDetail, RecipeProductDetail, RecipeStatus,
        },
    };

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample_detail() -> RecipeDetail {
        let emitted = Utc.with_ymd_and_hms(2026, 3, 5, 14, 0, 0).unwrap();
        let client = Client {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Juan".into(),
            company: "AgroSur".into(),
            establishment: None,
            contact: None,
            email: None,
            address: None,
            created_at: emitted,
            updated_at: emitted,
        };
        let header = Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            recipe_number: 152,
            client_id: client.id,
            technical_advisor: "Gómez".into(),
            emitted_at: emitted,
            diagnosis: Some("<script>alert(1)</script>".into()),
            status: RecipeStatus::Open,
            application_type: ApplicationType::Aerial,
            comments: None,
            created_at: emitted,
            updated_at: emitted,
        };
        let lots = vec![
            RecipeLotDetail {
                id: Uuid::new_v4(),
                lot_id: Uuid::new_v4(),
                applied_area_ha: dec("30.50"),
                lot_name: "Norte".into(),
                lot_area_ha: dec("30.50"),
                latitude: Some(-33.5),
                longitude: None,
            },
            RecipeLotDetail {
                id: Uuid::new_v4(),
                lot_id: Uuid::new_v4(),
                applied_area_ha: dec("15"),
                lot_name: "Sur".into(),
                lot_area_ha: dec("15"),
                latitude: None,
                longitude: None,
            },
        ];
        let products = vec![RecipeProductDetail {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            mix_order: 1,
            dose_per_ha: dec("2.5000"),
            dose_unit: "lts/ha".into(),
            total_dose: dec("113.7500"),
            total_unit: "lts".into(),
            product_name: "Glifosato".into(),
            composition: None,
            brand: None,
        }];

        RecipeDetail::new(header, client, lots, products)
    }

    // Argentina, UTC-3
    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        local(2026, 10, 17, 10, 0)
    }

    fn fonts_dir() -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("fonts")
    }

    #[test]
    fn html_carries_header_dates_and_totals() {
        let html = render_recipe_html(&sample_detail(), now());

        assert!(html.contains("APLICAR | <span>AGRORECETA</span>"));
        assert!(html.contains("RECETA FITOSANITARIA"));
        assert!(html.contains("RECETA N° 152"));
        assert!(html.contains("[ABIERTA]"));
        assert!(html.contains("AÉREA"));
        assert!(html.contains("05/03/2026"));
        assert!(html.contains("17/10/2026"));
        assert!(html.contains("24/10/2026"));
        assert!(html.contains("Total a aplicar: 45.50 ha"));
    }

    #[test]
    fn html_lines_show_doses_and_dash_defaults() {
        let html = render_recipe_html(&sample_detail(), now());

        assert!(html.contains("2.5 lts/ha"));
        assert!(html.contains("113.75 lts"));
        assert!(html.contains(">-33.5<"));
        assert!(html.contains("<b>ESTABLECIMIENTO:</b> -<br/>"));
        assert!(html.contains(NO_COMMENTS));
    }

    #[test]
    fn html_escapes_stored_values() {
        let html = render_recipe_html(&sample_detail(), now());

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn escape_covers_quotes_and_ampersands() {
        assert_eq!(
            html_escape(r#"Pérez & "Hijos" 'SA' <b>"#),
            "Pérez &amp; &quot;Hijos&quot; &#39;SA&#39; &lt;b&gt;"
        );
        assert_eq!(html_escape("lts/ha Soja 1ra"), "lts/ha Soja 1ra");
    }

    #[test]
    fn emission_date_uses_the_local_day() {
        // 22:30 em Buenos Aires já é o dia seguinte em UTC
        let mut detail = sample_detail();
        detail.header.emitted_at = Utc.with_ymd_and_hms(2026, 3, 6, 1, 30, 0).unwrap();

        let html = render_recipe_html(&detail, local(2026, 3, 5, 23, 0));
        assert!(html.contains("<strong>FECHA DE EMISIÓN</strong>05/03/2026"));
        assert!(html.contains("<span style=\"color: #0288d1;\">05/03/2026</span>"));
        assert!(!html.contains("06/03/2026"));
    }

    #[test]
    fn expiry_crosses_month_boundaries() {
        let html = render_recipe_html(&sample_detail(), local(2026, 1, 28, 9, 0));
        assert!(html.contains("04/02/2026"));
    }

    #[test]
    fn pdf_requires_the_font_files() {
        let service = DocumentService::new("/nonexistent/agroreceta-fonts");
        let err = service.render_pdf(&sample_detail(), now()).unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }

    #[test]
    fn pdf_renders_with_the_bundled_fonts() {
        let service = DocumentService::new(fonts_dir());
        let mut detail = sample_detail();
        detail.header.comments = Some("Aplicar con viento menor a 15 km/h.".into());

        let pdf = service.render_pdf(&detail, now()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert!(pdf.len() > 1000);
    }

    #[test]
    fn qr_identifies_the_recipe() {
        let detail = sample_detail();
        assert_eq!(
            qr_payload(&detail),
            format!("AGRORECETA|152|{}", detail.header.id)
        );
    }
}
