//! Backend JSON shapes and their conversion to domain types.
//!
//! The backend names the same field differently depending on the endpoint
//! (`id` vs `id_requerimiento`, `nombre` vs `nombre_subgrupo_denuncia`).
//! Serde aliases absorb those differences so the rest of the crate only sees
//! one canonical record per entity.

use serde::{Deserialize, Serialize};

use common::{AppError, AppResult};
use domain::{
    phone, user::parse_created_at, Classification, Family, Group, HierarchyPath, NewNode, PathNode,
    Requirement, RequirementUpdate, Role, Subgroup, User, UserSummary, ValidUser,
};

/// Placeholder the backend puts in ancestor names it could not resolve
const UNAVAILABLE_NAME: &str = "no disponible";

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let trimmed = v.trim();
        !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(UNAVAILABLE_NAME)
    })
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserDto {
    pub id_usuario: i64,
    #[serde(default)]
    pub nombre_usuario: String,
    #[serde(default)]
    pub apellido_pat_usuario: String,
    #[serde(default)]
    pub apellido_mat_usuario: String,
    #[serde(default)]
    pub rut_usuario: String,
    #[serde(default)]
    pub telefono_movil_usuario: String,
    #[serde(default)]
    pub correo_electronico_usuario: String,
    #[serde(default = "default_true")]
    pub estado_usuario: bool,
    pub id_rol: Option<i64>,
    pub rol_nombre: Option<String>,
    pub id_turno: Option<i64>,
    pub turno_nombre: Option<String>,
    pub direccion_usuario: Option<String>,
    pub fecha_creacion: Option<String>,
}

impl TryFrom<UserDto> for User {
    type Error = AppError;

    fn try_from(dto: UserDto) -> AppResult<Self> {
        let role = match dto.id_rol {
            Some(id) => Role::try_from(id)?,
            None => dto
                .rol_nombre
                .as_deref()
                .and_then(Role::from_name)
                .ok_or_else(|| {
                    AppError::Decode(format!("user {} has no recognizable role", dto.id_usuario))
                })?,
        };

        Ok(User {
            id: dto.id_usuario,
            first_name: dto.nombre_usuario,
            paternal_last_name: dto.apellido_pat_usuario,
            maternal_last_name: dto.apellido_mat_usuario,
            rut: domain::rut::clean(&dto.rut_usuario),
            phone: phone::strip(&dto.telefono_movil_usuario),
            email: dto.correo_electronico_usuario,
            role,
            role_name: non_blank(dto.rol_nombre),
            shift_id: dto.id_turno,
            shift_name: non_blank(dto.turno_nombre),
            active: dto.estado_usuario,
            address: non_blank(dto.direccion_usuario),
            created_at: dto.fecha_creacion.as_deref().and_then(parse_created_at),
        })
    }
}

/// Summary returned by search and by user mutations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserSummaryDto {
    pub id_usuario: i64,
    pub nombre_completo: Option<String>,
    pub rut_usuario: Option<String>,
    pub correo_electronico_usuario: Option<String>,
    pub rol_nombre: Option<String>,
    pub estado_usuario: Option<bool>,
}

impl From<UserSummaryDto> for UserSummary {
    fn from(dto: UserSummaryDto) -> Self {
        Self {
            id: dto.id_usuario,
            full_name: non_blank(dto.nombre_completo),
            rut: non_blank(dto.rut_usuario),
            email: non_blank(dto.correo_electronico_usuario),
            role_name: non_blank(dto.rol_nombre),
            active: dto.estado_usuario,
        }
    }
}

/// Body of user create (POST) and update (PUT).
#[derive(Debug, Clone, Serialize)]
pub struct UserPayload {
    pub nombre_usuario: String,
    pub apellido_pat_usuario: String,
    pub apellido_mat_usuario: String,
    pub rut_usuario: String,
    /// Nine-digit mobile number, e.g. `987654321`
    pub telefono_movil_usuario: String,
    pub correo_electronico_usuario: String,
    pub id_rol: i64,
    /// Sent as `null` to clear the shift
    pub id_turno: Option<i64>,
    pub estado_usuario: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion_usuario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl From<&ValidUser> for UserPayload {
    fn from(user: &ValidUser) -> Self {
        Self {
            nombre_usuario: user.first_name.clone(),
            apellido_pat_usuario: user.paternal_last_name.clone(),
            apellido_mat_usuario: user.maternal_last_name.clone(),
            rut_usuario: user.rut.clone(),
            telefono_movil_usuario: user.phone.clone(),
            correo_electronico_usuario: user.email.clone(),
            id_rol: user.role.id(),
            id_turno: user.shift_id,
            estado_usuario: user.active,
            direccion_usuario: user.address.clone(),
            password: user.password.as_ref().map(|p| p.as_str().to_string()),
        }
    }
}

// =============================================================================
// Taxonomy
// =============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FamilyDto {
    #[serde(alias = "id_familia_denuncia")]
    pub id: i64,
    #[serde(alias = "nombre")]
    pub nombre_familia_denuncia: String,
    #[serde(alias = "codigo")]
    pub codigo_familia: Option<String>,
}

impl From<FamilyDto> for Family {
    fn from(dto: FamilyDto) -> Self {
        Self {
            id: dto.id,
            name: dto.nombre_familia_denuncia,
            code: non_blank(dto.codigo_familia),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupDto {
    #[serde(alias = "id")]
    pub id_grupo_denuncia: i64,
    #[serde(alias = "nombre")]
    pub nombre_grupo_denuncia: String,
    #[serde(alias = "codigo")]
    pub codigo_grupo: Option<String>,
    pub id_familia_denuncia: Option<i64>,
}

impl From<GroupDto> for Group {
    fn from(dto: GroupDto) -> Self {
        Self {
            id: dto.id_grupo_denuncia,
            name: dto.nombre_grupo_denuncia,
            code: non_blank(dto.codigo_grupo),
            family_id: dto.id_familia_denuncia,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubgroupDto {
    #[serde(alias = "id")]
    pub id_subgrupo_denuncia: i64,
    #[serde(alias = "nombre")]
    pub nombre_subgrupo_denuncia: String,
    #[serde(alias = "codigo")]
    pub codigo_subgrupo: Option<String>,
    pub id_grupo_denuncia: Option<i64>,
}

impl From<SubgroupDto> for Subgroup {
    fn from(dto: SubgroupDto) -> Self {
        Self {
            id: dto.id_subgrupo_denuncia,
            name: dto.nombre_subgrupo_denuncia,
            code: non_blank(dto.codigo_subgrupo),
            group_id: dto.id_grupo_denuncia,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequirementDto {
    #[serde(alias = "id_requerimiento")]
    pub id: i64,
    #[serde(alias = "nombre")]
    pub nombre_requerimiento: String,
    #[serde(alias = "clasificacion")]
    pub clasificacion_requerimiento: Option<String>,
    pub descripcion_requerimiento: Option<String>,
    #[serde(alias = "codigo")]
    pub codigo_requerimiento: Option<String>,
    pub id_subgrupo_denuncia: Option<i64>,
    pub familia_nombre: Option<String>,
    pub grupo_nombre: Option<String>,
    pub subgrupo_nombre: Option<String>,
}

impl TryFrom<RequirementDto> for Requirement {
    type Error = AppError;

    fn try_from(dto: RequirementDto) -> AppResult<Self> {
        // Backend default when none was given
        let classification = match non_blank(dto.clasificacion_requerimiento) {
            Some(raw) => raw.parse::<Classification>()?,
            None => Classification::Medium,
        };

        Ok(Requirement {
            id: dto.id,
            name: dto.nombre_requerimiento,
            classification,
            description: non_blank(dto.descripcion_requerimiento),
            code: non_blank(dto.codigo_requerimiento),
            subgroup_id: dto.id_subgrupo_denuncia,
            family_name: non_blank(dto.familia_nombre),
            group_name: non_blank(dto.grupo_nombre),
            subgroup_name: non_blank(dto.subgrupo_nombre),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathNodeDto {
    pub id: i64,
    #[serde(default)]
    pub nombre: String,
    pub codigo: Option<String>,
}

impl From<PathNodeDto> for PathNode {
    fn from(dto: PathNodeDto) -> Self {
        Self {
            id: dto.id,
            name: dto.nombre,
            code: non_blank(dto.codigo),
        }
    }
}

/// Response of the requirement ancestor lookup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HierarchyPathDto {
    pub familia: Option<PathNodeDto>,
    pub grupo: Option<PathNodeDto>,
    pub subgrupo: Option<PathNodeDto>,
}

impl From<HierarchyPathDto> for HierarchyPath {
    fn from(dto: HierarchyPathDto) -> Self {
        Self {
            family: dto.familia.map(PathNode::from),
            group: dto.grupo.map(PathNode::from),
            subgroup: dto.subgrupo.map(PathNode::from),
        }
    }
}

/// Id of a freshly created node, whatever the level's id field is called.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedNodeDto {
    #[serde(
        alias = "id_familia_denuncia",
        alias = "id_grupo_denuncia",
        alias = "id_subgrupo_denuncia",
        alias = "id_requerimiento"
    )]
    pub id: i64,
}

/// Body of a node create (POST).
#[derive(Debug, Clone, Serialize)]
pub struct NodePayload {
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub familia_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grupo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgrupo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clasificacion: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

impl From<&NewNode> for NodePayload {
    fn from(node: &NewNode) -> Self {
        let parent_of = |level| {
            node.parent_id
                .filter(|_| node.level.parent() == Some(level))
        };
        Self {
            nombre: node.name.clone(),
            familia_id: parent_of(domain::Level::Family),
            grupo_id: parent_of(domain::Level::Group),
            subgrupo_id: parent_of(domain::Level::Subgroup),
            clasificacion: node.classification,
            descripcion: node.description.clone(),
        }
    }
}

/// Body of a requirement update (PUT).
#[derive(Debug, Clone, Serialize)]
pub struct RequirementUpdatePayload {
    pub nombre_requerimiento: String,
    pub clasificacion_requerimiento: Classification,
    pub descripcion_requerimiento: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_subgrupo_denuncia: Option<i64>,
}

impl From<&RequirementUpdate> for RequirementUpdatePayload {
    fn from(update: &RequirementUpdate) -> Self {
        Self {
            nombre_requerimiento: update.name.clone(),
            clasificacion_requerimiento: update.classification,
            descripcion_requerimiento: update.description.clone(),
            id_subgrupo_denuncia: update.subgroup_id,
        }
    }
}
