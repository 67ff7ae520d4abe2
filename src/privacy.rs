//! Static privacy policy, served as JSON and as plain text.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

const BUSINESS_NAME: &str = "Consultoría Tecnológica";
const CONTACT_EMAIL: &str = "privacidad@consultoria.dev";

#[derive(Debug, Clone, Serialize)]
pub struct PolicySection {
    pub title: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrivacyPolicy {
    pub business: &'static str,
    pub contact_email: &'static str,
    pub last_updated: NaiveDate,
    pub sections: &'static [PolicySection],
}

const SECTIONS: &[PolicySection] = &[
    PolicySection {
        title: "Información que recopilamos",
        body: "Cuando completas el formulario de contacto guardamos tu nombre, correo, \
               empresa, sitio web, teléfono y la descripción de tu necesidad, junto con \
               datos técnicos de la visita (navegador, página de origen, dirección IP y \
               parámetros de campaña). Cuando nos escribes por WhatsApp recibimos tu número \
               y el texto de tus mensajes.",
    },
    PolicySection {
        title: "Cómo usamos la información",
        body: "Usamos estos datos únicamente para responder a tu solicitud, priorizar el \
               seguimiento comercial y medir qué canales nos traen contactos. Los mensajes \
               de WhatsApp se usan para enviarte una respuesta y no se almacenan.",
    },
    PolicySection {
        title: "Compartición con terceros",
        body: "No vendemos tus datos. Los mensajes de WhatsApp se procesan a través de la \
               plataforma WhatsApp Business de Meta, sujeta a sus propias políticas.",
    },
    PolicySection {
        title: "Conservación",
        body: "Conservamos los datos de contacto mientras exista una relación comercial o \
               hasta que solicites su eliminación.",
    },
    PolicySection {
        title: "Tus derechos",
        body: "Puedes solicitar acceso, rectificación o eliminación de tus datos escribiendo \
               al correo de contacto indicado en esta política.",
    },
];

/// The privacy policy as of `today`.
pub fn privacy_policy(today: NaiveDate) -> PrivacyPolicy {
    PrivacyPolicy {
        business: BUSINESS_NAME,
        contact_email: CONTACT_EMAIL,
        last_updated: today,
        sections: SECTIONS,
    }
}

/// Plain-text rendering of [`privacy_policy`].
pub fn privacy_text(today: NaiveDate) -> String {
    let policy = privacy_policy(today);
    let mut text = String::new();

    text.push_str(&format!("Política de Privacidad - {}\n", policy.business));
    text.push_str(&format!(
        "Última actualización: {}\n\n",
        policy.last_updated.format("%Y-%m-%d")
    ));

    for (i, section) in policy.sections.iter().enumerate() {
        text.push_str(&format!("{}. {}\n{}\n\n", i + 1, section.title, section.body));
    }

    text.push_str(&format!("Contacto: {}\n", policy.contact_email));
    text
}

/// GET /privacy
pub async fn get_privacy() -> Json<PrivacyPolicy> {
    Json(privacy_policy(Utc::now().date_naive()))
}

/// GET /privacy/text
pub async fn get_privacy_text() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        privacy_text(Utc::now().date_naive()),
    )
}
