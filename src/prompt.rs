// Prompt composition

use crate::models::FormInput;

/// Persona and behavior constraints sent alongside every request.
pub const SYSTEM_INSTRUCTION: &str = "Eres un asistente experto en prompting estratégico para pymes y retailers. Tu objetivo es generar prompts listos para usar que sean altamente efectivos, aplicando las mejores técnicas (One-Shot, Chain of Thought, EGI, DRCA, Autodiagnóstico, Ingeniería Inversa y Sintaxis de Precisión). Personaliza los prompts según el área del negocio, el reto y el tipo de empresa. Sé claro, directo y estratégico. Evita tecnicismos innecesarios. El resultado debe ser un prompt potente, editable y accionable.";

/// The instruction sent as the user message, with its fixed system instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub instruction: String,
    pub system_instruction: &'static str,
}

pub fn compose(input: &FormInput) -> ComposedPrompt {
    let FormInput {
        area_de_negocio,
        reto,
        tipo_de_pyme,
        tecnica_prompting,
        tono,
    } = input;

    let instruction = format!(
        "
Actúa como un generador experto en prompts para negocios del tipo {tipo_de_pyme}. Aplica la técnica {tecnica_prompting} para ayudar en el área de {area_de_negocio} con el siguiente reto: \"{reto}\".

Tu tarea es crear un prompt altamente personalizado, directo y accionable, que use un tono {tono}. El prompt debe estar listo para ser usado en herramientas de IA como ChatGPT.

Prompt generado:
---
"
    );

    ComposedPrompt {
        instruction,
        system_instruction: SYSTEM_INSTRUCTION,
    }
}
