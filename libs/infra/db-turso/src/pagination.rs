// [libs/infra/db-turso/src/pagination.rs]
/*!
 * =================================================================
 * APARATO: CURSOR PAGINATION CONTRACTS (V3.1 - SINGLE PATH)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CONTRATO ÚNICO DE PAGINACIÓN POR CURSOR
 *
 * La paginación por offset legado fue erradicada: el cursor es la única
 * ruta soportada y su fallo es fatal para el selector.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Petición de página por cursor (after exclusivo, first acotado).
#[derive(Debug, Clone)]
pub struct CursorRequest {
    /// Cursor exclusivo de arranque; None abre desde el principio.
    pub after: Option<String>,
    pub first: usize,
    pub sort_order: SortOrder,
}

impl CursorRequest {
    pub fn from_start(first: usize) -> Self {
        Self { after: None, first, sort_order: SortOrder::Asc }
    }

    pub fn after(cursor: impl Into<String>, first: usize) -> Self {
        Self { after: Some(cursor.into()), first, sort_order: SortOrder::Asc }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_next: bool,
    pub end_cursor: Option<String>,
    pub total_count: u64,
}

/// Página materializada del stream de candidatos.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn empty(total_count: u64) -> Self {
        Self {
            data: Vec::new(),
            page_info: PageInfo { has_next: false, end_cursor: None, total_count },
        }
    }
}
