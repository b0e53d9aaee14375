use serde::{Deserialize, Serialize};

/// The five business-context values read from the form at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub area_de_negocio: String,
    pub reto: String,
    pub tipo_de_pyme: String,
    pub tecnica_prompting: String,
    pub tono: String,
}

impl FormInput {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::AreaDeNegocio => &self.area_de_negocio,
            FormField::Reto => &self.reto,
            FormField::TipoDePyme => &self.tipo_de_pyme,
            FormField::TecnicaPrompting => &self.tecnica_prompting,
            FormField::Tono => &self.tono,
        }
    }

    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::AreaDeNegocio => &mut self.area_de_negocio,
            FormField::Reto => &mut self.reto,
            FormField::TipoDePyme => &mut self.tipo_de_pyme,
            FormField::TecnicaPrompting => &mut self.tecnica_prompting,
            FormField::Tono => &mut self.tono,
        }
    }

    /// Replace the field with the next (or previous) preset value.
    ///
    /// A value that is not one of the presets jumps to the first (or last) preset.
    pub fn cycle_preset(&mut self, field: FormField, forward: bool) {
        let presets = field.presets();
        if presets.is_empty() {
            return;
        }

        let current = presets.iter().position(|p| *p == self.value(field));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % presets.len(),
            (Some(i), false) => (i + presets.len() - 1) % presets.len(),
            (None, true) => 0,
            (None, false) => presets.len() - 1,
        };

        *self.value_mut(field) = presets[next].to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    AreaDeNegocio,
    Reto,
    TipoDePyme,
    TecnicaPrompting,
    Tono,
}

impl FormField {
    pub const ALL: [Self; 5] = [
        Self::AreaDeNegocio,
        Self::Reto,
        Self::TipoDePyme,
        Self::TecnicaPrompting,
        Self::Tono,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::AreaDeNegocio => "Área de negocio",
            Self::Reto => "Reto",
            Self::TipoDePyme => "Tipo de pyme",
            Self::TecnicaPrompting => "Técnica de prompting",
            Self::Tono => "Tono",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::AreaDeNegocio => "Ej: Ventas, Marketing, Atención al cliente",
            Self::Reto => "Describe el reto que quieres resolver",
            Self::TipoDePyme => "Ej: Retail, Restaurante, Servicios",
            Self::TecnicaPrompting => "←/→ para elegir técnica",
            Self::Tono => "←/→ para elegir tono",
        }
    }

    pub const fn presets(self) -> &'static [&'static str] {
        match self {
            Self::AreaDeNegocio | Self::Reto => &[],
            Self::TipoDePyme => &[
                "Retail",
                "E-commerce",
                "Restaurante",
                "Servicios profesionales",
                "Manufactura",
            ],
            Self::TecnicaPrompting => &[
                "One-Shot",
                "Chain of Thought",
                "EGI",
                "DRCA",
                "Autodiagnóstico",
                "Ingeniería Inversa",
                "Sintaxis de Precisión",
            ],
            Self::Tono => &["profesional", "cercano", "directo", "persuasivo", "inspirador"],
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Whole-request timeout in seconds. Unset leaves timing to the transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            request_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_mut_targets_the_right_field() {
        let mut input = FormInput::default();
        input.value_mut(FormField::Reto).push_str("Bajo volumen de leads");
        assert_eq!(input.reto, "Bajo volumen de leads");
        assert_eq!(input.value(FormField::Reto), "Bajo volumen de leads");
        assert!(input.area_de_negocio.is_empty());
    }

    #[test]
    fn test_field_navigation_wraps() {
        assert_eq!(FormField::Tono.next(), FormField::AreaDeNegocio);
        assert_eq!(FormField::AreaDeNegocio.previous(), FormField::Tono);
        assert_eq!(FormField::Reto.next(), FormField::TipoDePyme);
    }

    #[test]
    fn test_cycle_preset_forward_and_back() {
        let mut input = FormInput::default();
        input.cycle_preset(FormField::TecnicaPrompting, true);
        assert_eq!(input.tecnica_prompting, "One-Shot");
        input.cycle_preset(FormField::TecnicaPrompting, true);
        assert_eq!(input.tecnica_prompting, "Chain of Thought");
        input.cycle_preset(FormField::TecnicaPrompting, false);
        input.cycle_preset(FormField::TecnicaPrompting, false);
        assert_eq!(input.tecnica_prompting, "Sintaxis de Precisión");
    }

    #[test]
    fn test_cycle_preset_ignores_free_text_fields() {
        let mut input = FormInput {
            area_de_negocio: "Ventas".to_string(),
            ..Default::default()
        };
        input.cycle_preset(FormField::AreaDeNegocio, true);
        assert_eq!(input.area_de_negocio, "Ventas");
    }

    #[test]
    fn test_custom_value_jumps_to_first_preset() {
        let mut input = FormInput {
            tono: "irónico".to_string(),
            ..Default::default()
        };
        input.cycle_preset(FormField::Tono, true);
        assert_eq!(input.tono, "profesional");
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_app_config_fills_missing_keys() {
        let config: AppConfig = toml::from_str("model = \"gemini-2.5-pro\"").unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.api_base_url, "https://generativelanguage.googleapis.com");
    }
}
