//! Keyword router for inbound WhatsApp text.
//!
//! A catalog is a flat, ordered list of rules; the first rule with a keyword contained
//! in the normalised text wins. No match yields the catalog's default reply, which
//! echoes the original text. Nothing is remembered between messages.

use crate::normalize::fold_text;

/// Reply categories the router can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCategory {
    Greeting,
    Services,
    Pricing,
    Contact,
    Default,
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub category: ReplyCategory,
    /// Matched as substrings of the lower-cased, accent-folded text.
    pub keywords: &'static [&'static str],
    pub response: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ReplyCatalog {
    pub rules: &'static [KeywordRule],
    /// `{text}` is replaced with the original message.
    pub default_template: &'static str,
}

/// A routed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub category: ReplyCategory,
    pub body: String,
}

const GREETING: KeywordRule = KeywordRule {
    category: ReplyCategory::Greeting,
    keywords: &[
        "hola",
        "buenos dias",
        "buenas tardes",
        "buenas noches",
        "buen dia",
        "saludos",
        "hello",
    ],
    response: "¡Hola! 👋 Gracias por escribirnos. Somos una consultora de tecnología: \
               automatizamos procesos, integramos CRMs y construimos dashboards. \
               Cuéntanos, ¿en qué podemos ayudarte?",
};

const SERVICES: KeywordRule = KeywordRule {
    category: ReplyCategory::Services,
    keywords: &[
        "servicio",
        "que hacen",
        "automatiz",
        "integracion",
        "crm",
        "dashboard",
        "desarrollo",
    ],
    response: "Estos son nuestros servicios principales:\n\
               • Automatización de procesos\n\
               • Integraciones y CRM\n\
               • Dashboards y visibilidad de datos\n\
               • Desarrollo de software a medida\n\
               ¿Cuál te interesa?",
};

const PRICING: KeywordRule = KeywordRule {
    category: ReplyCategory::Pricing,
    keywords: &[
        "precio",
        "costo",
        "cuanto cuesta",
        "cuanto vale",
        "cotizacion",
        "presupuesto",
        "tarifa",
    ],
    response: "Cada proyecto se cotiza según su alcance. Agenda un diagnóstico gratuito \
               de 30 minutos y te enviamos una propuesta con precio cerrado.",
};

const CONTACT: KeywordRule = KeywordRule {
    category: ReplyCategory::Contact,
    keywords: &[
        "contacto",
        "llamada",
        "llamar",
        "reunion",
        "agendar",
        "cita",
        "correo",
    ],
    response: "Con gusto te contactamos. Déjanos tu nombre, empresa y el mejor horario \
               para llamarte, o completa el formulario de contacto en nuestro sitio web.",
};

const LEGACY_GREETING: KeywordRule = KeywordRule {
    category: ReplyCategory::Greeting,
    keywords: &["hola", "buenos dias", "buenas tardes"],
    response: "¡Hola! Gracias por contactarnos. ¿En qué podemos ayudarte?",
};

const LEGACY_PRICING: KeywordRule = KeywordRule {
    category: ReplyCategory::Pricing,
    keywords: &["precio", "costo", "cotizacion"],
    response: "Para una cotización personalizada, visita nuestro sitio web y completa el \
               formulario de contacto.",
};

impl ReplyCatalog {
    /// Catalog used by `/webhooks/whatsapp`.
    pub const STANDARD: ReplyCatalog = ReplyCatalog {
        rules: &[GREETING, SERVICES, PRICING, CONTACT],
        default_template: "Recibimos tu mensaje: \"{text}\". Un consultor de nuestro equipo \
                           te responderá en breve.",
    };

    /// Smaller catalog kept for the legacy `/whatsapp` route.
    pub const LEGACY: ReplyCatalog = ReplyCatalog {
        rules: &[LEGACY_GREETING, LEGACY_PRICING],
        default_template: "Gracias por tu mensaje: \"{text}\". Te responderemos pronto.",
    };

    /// Routes one inbound text to its reply.
    pub fn dispatch(&self, text: &str) -> Reply {
        let normalized = fold_text(text);

        for rule in self.rules {
            if rule.keywords.iter().any(|k| normalized.contains(k)) {
                return Reply {
                    category: rule.category,
                    body: rule.response.to_string(),
                };
            }
        }

        Reply {
            category: ReplyCategory::Default,
            body: self.default_template.replace("{text}", text.trim()),
        }
    }
}
