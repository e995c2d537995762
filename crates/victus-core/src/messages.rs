// ── User-facing error messages ──
//
// Translates a `CoreError` into the Spanish sentence a view shows.
// Known server codes win; a 422 carries the server's own wording.

use crate::error::CoreError;

pub const SERVICE_UNAVAILABLE: &str =
    "El servicio no está disponible en este momento. Intenta nuevamente más tarde.";
pub const GENERIC_FAILURE: &str = "No se pudo completar la operación. Intenta de nuevo.";

/// Server error codes with a dedicated message.
const CODE_MESSAGES: &[(&str, &str)] = &[
    ("DEPARTAMENTO_DUPLICADO", "Ya existe un departamento con ese nombre."),
    ("DEPARTAMENTO_NO_ENCONTRADO", "El departamento no existe."),
    ("DEPARTAMENTO_CON_CIUDADES", "No se puede eliminar un departamento con ciudades asociadas."),
    ("CIUDAD_DUPLICADA", "Ya existe una ciudad con ese nombre en el departamento."),
    ("CIUDAD_NO_ENCONTRADA", "La ciudad no existe."),
    ("CIUDAD_INVALIDA", "La ciudad no pertenece al departamento seleccionado."),
    ("CIUDAD_CON_CONJUNTOS", "No se puede eliminar una ciudad con conjuntos asociados."),
    ("CONJUNTO_DUPLICADO", "Ya existe un conjunto residencial con ese nombre en la ciudad."),
    ("CONJUNTO_NO_ENCONTRADO", "El conjunto residencial no existe."),
    ("ADMINISTRADOR_NO_ENCONTRADO", "El administrador seleccionado no existe."),
    ("VIVIENDA_DUPLICADA", "Ya existe una vivienda con ese número en el conjunto."),
    ("VIVIENDA_NO_ENCONTRADA", "La vivienda no existe."),
    ("TELEFONO_INVALIDO", "El teléfono no tiene un formato válido."),
];

/// The message to show for an error.
pub fn user_message(err: &CoreError) -> String {
    if let Some(message) = err.api_error_code().and_then(code_message) {
        return message.to_owned();
    }
    match err {
        CoreError::Remote {
            status: 422,
            message,
            ..
        } if !message.trim().is_empty() => message.clone(),
        CoreError::Remote { status: 404, .. } | CoreError::NotFound { .. } => {
            "El registro solicitado no existe.".into()
        }
        CoreError::Remote { status, .. } if *status >= 500 => SERVICE_UNAVAILABLE.into(),
        CoreError::Transport { .. } | CoreError::Shutdown => SERVICE_UNAVAILABLE.into(),
        CoreError::Validation { message } => message.clone(),
        _ => GENERIC_FAILURE.into(),
    }
}

fn code_message(code: &str) -> Option<&'static str> {
    CODE_MESSAGES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, message)| *message)
}
