//! Pickup requests routed to collection operators.

use crate::error::DispatchError;
use crate::vehicle::VehicleCategory;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A person who can be asked to send a truck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: u32,
    pub name: String,
    pub role: String,
    pub category: VehicleCategory,
    pub phone: String,
    pub available: bool,
}

impl Operator {
    fn new(id: u32, name: &str, category: VehicleCategory, phone: &str, available: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            role: format!("Operator in charge of {}", category.label()),
            category,
            phone: phone.to_string(),
            available,
        }
    }

    /// Uppercase initials of the first two name parts
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .take(2)
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// A request accepted by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupRequest {
    pub operator_id: u32,
    pub operator_name: String,
    /// Category applied to the assigned truck
    pub category: VehicleCategory,
}

impl PickupRequest {
    /// Status line while waiting for the assignment
    pub fn contacting_message(&self) -> String {
        format!("Contacting {}...", self.operator_name)
    }

    /// Status line once a truck is assigned
    pub fn assigned_message(&self) -> String {
        format!("{} unit assigned.", self.category.label())
    }
}

/// The operators on duty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    operators: Vec<Operator>,
}

impl Default for Roster {
    fn default() -> Self {
        use VehicleCategory::*;
        Self::new(vec![
            Operator::new(1, "Carlos Mendoza Ríos", Organic, "+51987654321", true),
            Operator::new(2, "Ana María Torres", Recyclable, "+51987654322", true),
            Operator::new(3, "Jorge Luis Paredes", General, "+51987654323", false),
            Operator::new(4, "María Elena Vásquez", General, "+51987654324", true),
            Operator::new(5, "Roberto Chávez Silva", Hazardous, "+51987654325", true),
        ])
    }
}

impl Roster {
    pub fn new(operators: Vec<Operator>) -> Self {
        Self { operators }
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn get(&self, id: u32) -> Option<&Operator> {
        self.operators.iter().find(|o| o.id == id)
    }

    /// First available operator handling `category`
    pub fn available_for(&self, category: VehicleCategory) -> Option<&Operator> {
        self.operators
            .iter()
            .find(|o| o.available && o.category == category)
    }

    /// Ask an operator to send a truck
    pub fn request(&self, operator_id: u32) -> Result<PickupRequest, DispatchError> {
        let operator = self
            .get(operator_id)
            .ok_or(DispatchError::UnknownOperator(operator_id))?;

        if !operator.available {
            return Err(DispatchError::OperatorUnavailable {
                name: operator.name.clone(),
            });
        }

        info!(operator = %operator.name, category = %operator.category, "Pickup requested");
        Ok(PickupRequest {
            operator_id: operator.id,
            operator_name: operator.name.clone(),
            category: operator.category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster() {
        let roster = Roster::default();
        assert_eq!(roster.operators().len(), 5);
        assert_eq!(roster.operators().iter().filter(|o| !o.available).count(), 1);
        assert_eq!(roster.get(1).unwrap().initials(), "CM");
        assert_eq!(roster.get(2).unwrap().initials(), "AM");
    }

    #[test]
    fn test_request_assigns_category() {
        let request = Roster::default().request(5).unwrap();
        assert_eq!(request.category, VehicleCategory::Hazardous);
        assert_eq!(request.contacting_message(), "Contacting Roberto Chávez Silva...");
        assert_eq!(request.assigned_message(), "Hazardous unit assigned.");
    }

    #[test]
    fn test_request_errors() {
        let roster = Roster::default();
        assert_eq!(roster.request(42), Err(DispatchError::UnknownOperator(42)));
        assert!(matches!(
            roster.request(3),
            Err(DispatchError::OperatorUnavailable { ref name }) if name == "Jorge Luis Paredes"
        ));
    }

    #[test]
    fn test_available_for_skips_unavailable() {
        let roster = Roster::default();
        assert_eq!(roster.available_for(VehicleCategory::General).unwrap().id, 4);
    }
}
