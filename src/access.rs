//! The operators allowed to use a shop's ledger and what each of them may do.
//!
//! The list comes from `config.json`. An empty list turns access control off: every action is
//! allowed and nothing is attributed.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

serde_plain::derive_display_from_serialize!(Role);
serde_plain::derive_fromstr_from_deserialize!(Role);

/// A person who may record entries.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
    pub pin: String,
    #[serde(default)]
    pub role: Role,
}

impl Debug for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.name)
            .field("pin", &"****")
            .field("role", &self.role)
            .finish()
    }
}

/// Actions that are restricted to some roles.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Permission {
    /// Add, remove or adjust the transactions of a day, or enter non-payroll fixed expenses.
    Record,
    /// Payroll, the default opening float and closing the month.
    Administer,
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Record => f.write_str("record entries"),
            Permission::Administer => f.write_str("administer the month"),
        }
    }
}

/// The credentials an operator presents.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub name: &'a str,
    pub pin: &'a str,
}

pub enum AccessError {
    /// The list is not empty and no credentials were given.
    Missing,
    /// No operator matches the name and PIN.
    Invalid,
    /// The operator is known but their role does not allow the action.
    Denied {
        name: String,
        permission: Permission,
    },
}

impl Debug for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::Missing => f.write_str("an operator name and PIN are required"),
            AccessError::Invalid => f.write_str("unknown operator or wrong PIN"),
            AccessError::Denied { name, permission } => {
                write!(f, "{name} is not allowed to {permission}")
            }
        }
    }
}

impl std::error::Error for AccessError {}

/// The configured operators.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AccessList {
    operators: Vec<Operator>,
}

impl AccessList {
    pub fn new(operators: Vec<Operator>) -> Self {
        Self { operators }
    }

    pub fn is_open(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Finds the operator with `name` whose PIN matches. Names compare case-insensitively; PINs are
    /// compared in constant time and every operator is checked, so the time taken does not reveal
    /// which part was wrong.
    pub fn authenticate(&self, credentials: Credentials<'_>) -> Option<&Operator> {
        let name = credentials.name.trim();
        let mut found = None;
        for operator in &self.operators {
            let pin_ok: bool = operator
                .pin
                .as_bytes()
                .ct_eq(credentials.pin.as_bytes())
                .into();
            if pin_ok && operator.name.eq_ignore_ascii_case(name) && found.is_none() {
                found = Some(operator);
            }
        }
        found
    }

    /// Checks that `credentials` allow `permission`. Returns the name to record as `createdBy`,
    /// which is `None` when access control is off.
    pub fn authorize(
        &self,
        credentials: Option<Credentials<'_>>,
        permission: Permission,
    ) -> Result<Option<String>, AccessError> {
        if self.is_open() {
            return Ok(None);
        }
        let credentials = credentials.ok_or(AccessError::Missing)?;
        let Some(operator) = self.authenticate(credentials) else {
            warn!("Failed sign-in attempt for '{}'", credentials.name);
            return Err(AccessError::Invalid);
        };
        let allowed = match permission {
            Permission::Record => true,
            Permission::Administer => operator.role == Role::Admin,
        };
        if !allowed {
            return Err(AccessError::Denied {
                name: operator.name.clone(),
                permission,
            });
        }
        debug!("{} ({}) may {permission}", operator.name, operator.role);
        Ok(Some(operator.name.clone()))
    }
}
