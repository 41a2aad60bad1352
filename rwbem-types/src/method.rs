//! CIM methods and their parameters

use crate::error::ModelResult;
use crate::map::NameMap;
use crate::name::CimName;
use crate::qualifier::CimQualifier;
use crate::types::CimType;

/// A parameter of a CIM method declaration
#[derive(Debug, Clone, PartialEq)]
pub struct CimParameter {
    pub name: CimName,
    pub cim_type: CimType,
    pub is_array: bool,
    /// Fixed array size, when declared `[n]`
    pub array_size: Option<u32>,
    /// Referenced class, for REF-typed parameters only
    pub reference_class: Option<CimName>,
    pub qualifiers: NameMap<CimQualifier>,
}

impl CimParameter {
    pub fn new<N: Into<CimName>>(name: N, cim_type: CimType, is_array: bool) -> Self {
        Self {
            name: name.into(),
            cim_type,
            is_array,
            array_size: None,
            reference_class: None,
            qualifiers: NameMap::new(),
        }
    }

    pub fn reference<N: Into<CimName>, R: Into<CimName>>(
        name: N,
        reference_class: R,
        is_array: bool,
    ) -> Self {
        Self {
            name: name.into(),
            cim_type: CimType::Reference,
            is_array,
            array_size: None,
            reference_class: Some(reference_class.into()),
            qualifiers: NameMap::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: CimQualifier) -> Self {
        self.qualifiers.insert(qualifier.name.clone(), qualifier);
        self
    }

    pub fn with_array_size(mut self, size: u32) -> Self {
        self.array_size = Some(size);
        self
    }
}

/// A method declaration on a class
#[derive(Debug, Clone, PartialEq)]
pub struct CimMethod {
    pub name: CimName,
    pub return_type: CimType,
    pub class_origin: Option<CimName>,
    pub propagated: bool,
    pub parameters: NameMap<CimParameter>,
    pub qualifiers: NameMap<CimQualifier>,
}

impl CimMethod {
    pub fn new<N: Into<CimName>>(name: N, return_type: CimType) -> Self {
        Self {
            name: name.into(),
            return_type,
            class_origin: None,
            propagated: false,
            parameters: NameMap::new(),
            qualifiers: NameMap::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: CimParameter) -> Self {
        self.parameters.insert(parameter.name.clone(), parameter);
        self
    }

    pub fn with_qualifier(mut self, qualifier: CimQualifier) -> Self {
        self.qualifiers.insert(qualifier.name.clone(), qualifier);
        self
    }

    pub fn add_parameter(&mut self, parameter: CimParameter) -> ModelResult<()> {
        self.parameters.insert(parameter.name.clone(), parameter);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_keep_declaration_order() {
        let m = CimMethod::new("RequestStateChange", CimType::Uint32)
            .with_parameter(CimParameter::new("RequestedState", CimType::Uint16, false))
            .with_parameter(CimParameter::reference("Job", "CIM_Job", false))
            .with_parameter(
                CimParameter::new("TimeoutPeriod", CimType::DateTime, false),
            );
        let names: Vec<_> = m.parameters.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, ["RequestedState", "Job", "TimeoutPeriod"]);
        assert!(m.parameters.contains("job"));
    }
}
