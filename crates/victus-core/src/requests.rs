// ── Mutation payloads ──
//
// Request bodies in the backend's wire vocabulary. `validate()` catches
// what the server would reject anyway, before a round trip.

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{DwellingStatus, DwellingType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepartmentRequest {
    pub nombre: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRequest {
    pub nombre: String,
    pub departamento_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexRequest {
    pub nombre: String,
    pub direccion: String,
    pub telefono: String,
    pub departamento_id: String,
    pub ciudad_id: String,
    pub administrador_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DwellingRequest {
    pub numero: String,
    pub tipo: DwellingType,
    pub estado: DwellingStatus,
}

impl DepartmentRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        required("nombre", &self.nombre)
    }
}

impl CityRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        required("nombre", &self.nombre)?;
        required("departamentoId", &self.departamento_id)
    }
}

impl ComplexRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        required("nombre", &self.nombre)?;
        required("direccion", &self.direccion)?;
        required("departamentoId", &self.departamento_id)?;
        required("ciudadId", &self.ciudad_id)?;
        required("administradorId", &self.administrador_id)?;
        if !self.telefono.is_empty()
            && !self
                .telefono
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'))
        {
            return Err(CoreError::Validation {
                message: format!("telefono inválido: {}", self.telefono),
            });
        }
        Ok(())
    }
}

impl DwellingRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        required("numero", &self.numero)
    }
}

fn required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::Validation {
            message: format!("{field} es obligatorio"),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn complex_request_wire_shape() {
        let req = ComplexRequest {
            nombre: "Torres del Río".into(),
            direccion: "Cra 1 # 2-3".into(),
            telefono: "3001234567".into(),
            departamento_id: "D1".into(),
            ciudad_id: "C1".into(),
            administrador_id: "A1".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap_or_default(),
            json!({
                "nombre": "Torres del Río",
                "direccion": "Cra 1 # 2-3",
                "telefono": "3001234567",
                "departamentoId": "D1",
                "ciudadId": "C1",
                "administradorId": "A1",
            })
        );
        assert!(req.validate().is_ok());
    }

    #[test]
    fn dwelling_request_uses_spanish_labels() {
        let req = DwellingRequest {
            numero: "101".into(),
            tipo: DwellingType::Duplex,
            estado: DwellingStatus::Occupied,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap_or_default(),
            json!({ "numero": "101", "tipo": "Dúplex", "estado": "Ocupada" })
        );
    }

    #[test]
    fn blank_required_fields_rejected() {
        let err = CityRequest {
            nombre: "Pereira".into(),
            departamento_id: "  ".into(),
        }
        .validate();
        assert_eq!(
            err,
            Err(CoreError::Validation {
                message: "departamentoId es obligatorio".into()
            })
        );
        assert!(DepartmentRequest::default().validate().is_err());
    }

    #[test]
    fn bad_phone_rejected() {
        let req = ComplexRequest {
            nombre: "X".into(),
            direccion: "Y".into(),
            telefono: "call me".into(),
            departamento_id: "D".into(),
            ciudad_id: "C".into(),
            administrador_id: "A".into(),
        };
        assert!(matches!(req.validate(), Err(CoreError::Validation { .. })));
    }
}
