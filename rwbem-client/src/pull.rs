//! Pulled enumerations (DSP0200 `Open*`/`Pull*`/`CloseEnumeration`)
//!
//! Per open enumeration the state machine is
//! `Closed → Open(ctx) → Drained → Closed`: an `Open*` returns the first
//! batch plus a [`PullHandle`]; while the handle is open, `Pull*`
//! advances it; on `EndOfSequence` the handle drains and its context is
//! invalid. `CloseEnumeration` is accepted only in the open state.

use crate::connection::{bool_param, class_param, string_param, uint32_param, WbemConnection};
use crate::connection::{with_namespace, AssocOptions};
use crate::error::{CimError, ClientError, ClientResult};
use crate::status::CimStatusCode;
use rwbem_types::{CimInstance, CimInstanceName, CimValue, ObjectName};
use rwbem_xml::{CimXmlError, CimXmlItem, IMethodResult, OpParam};
use tracing::debug;

/// The client-side state of one open enumeration
#[derive(Debug, Clone)]
pub struct PullHandle {
    namespace: String,
    context: Option<String>,
    drained: bool,
}

impl PullHandle {
    fn from_result(namespace: String, result: &IMethodResult) -> ClientResult<Self> {
        let eos = match result.out_param("EndOfSequence") {
            Some(Some(CimValue::Boolean(b))) => *b,
            _ => {
                return Err(ClientError::Xml(CimXmlError::CimXmlParse {
                    element: "PARAMVALUE".to_string(),
                    offset: 0,
                    reason: "missing EndOfSequence output parameter".to_string(),
                }))
            }
        };
        let context = match result.out_param("EnumerationContext") {
            Some(Some(CimValue::String(s))) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        if !eos && context.is_none() {
            return Err(ClientError::Xml(CimXmlError::CimXmlParse {
                element: "PARAMVALUE".to_string(),
                offset: 0,
                reason: "open enumeration without an EnumerationContext".to_string(),
            }));
        }
        Ok(Self {
            namespace,
            context: if eos { None } else { context },
            drained: eos,
        })
    }

    fn advance(&mut self, result: &IMethodResult) -> ClientResult<()> {
        let next = Self::from_result(self.namespace.clone(), result)?;
        self.context = next.context;
        self.drained = next.drained;
        Ok(())
    }

    /// Whether the server reported `EndOfSequence`
    pub fn is_drained(&self) -> bool {
        self.drained
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn open_context(&self) -> ClientResult<String> {
        self.context.clone().ok_or_else(|| {
            ClientError::Cim(CimError::new(
                CimStatusCode::InvalidEnumerationContext,
                Some("enumeration is not open".to_string()),
            ))
        })
    }
}

impl WbemConnection {
    /// `OpenEnumerateInstances`: first batch of instances plus the pull
    /// handle
    pub fn open_enumerate_instances(
        &self,
        class_name: &str,
        namespace: Option<&str>,
        max_object_count: u32,
    ) -> ClientResult<(Vec<CimInstance>, PullHandle)> {
        let ns = normalize(self, namespace);
        let params = vec![
            class_param("ClassName", class_name),
            uint32_param("MaxObjectCount", max_object_count),
        ];
        let result = self.imethod("OpenEnumerateInstances", &ns, params, true)?;
        let handle = PullHandle::from_result(ns.clone(), &result)?;
        let instances = instances_of(result)?;
        debug!(count = instances.len(), drained = handle.is_drained(), "opened instance enumeration");
        Ok((with_namespace(instances, &ns), handle))
    }

    /// `OpenEnumerateInstancePaths`
    pub fn open_enumerate_instance_paths(
        &self,
        class_name: &str,
        namespace: Option<&str>,
        max_object_count: u32,
    ) -> ClientResult<(Vec<CimInstanceName>, PullHandle)> {
        let ns = normalize(self, namespace);
        let params = vec![
            class_param("ClassName", class_name),
            uint32_param("MaxObjectCount", max_object_count),
        ];
        let result = self.imethod("OpenEnumerateInstancePaths", &ns, params, true)?;
        let handle = PullHandle::from_result(ns.clone(), &result)?;
        let paths = paths_of(result, &ns)?;
        Ok((paths, handle))
    }

    /// `OpenAssociatorInstances`
    pub fn open_associator_instances(
        &self,
        source: &CimInstanceName,
        options: &AssocOptions,
        max_object_count: u32,
    ) -> ClientResult<(Vec<CimInstance>, PullHandle)> {
        self.open_traversal("OpenAssociatorInstances", source, options, max_object_count)
    }

    /// `OpenReferenceInstances`
    pub fn open_reference_instances(
        &self,
        source: &CimInstanceName,
        options: &AssocOptions,
        max_object_count: u32,
    ) -> ClientResult<(Vec<CimInstance>, PullHandle)> {
        self.open_traversal("OpenReferenceInstances", source, options, max_object_count)
    }

    fn open_traversal(
        &self,
        operation: &str,
        source: &CimInstanceName,
        options: &AssocOptions,
        max_object_count: u32,
    ) -> ClientResult<(Vec<CimInstance>, PullHandle)> {
        let ns = normalize(self, source.namespace.as_deref());
        let mut params = vec![(
            "InstanceName".to_string(),
            OpParam::ObjectName(ObjectName::Instance(source.clone())),
        )];
        let is_reference_op = operation.contains("Reference");
        if !is_reference_op {
            if let Some(assoc_class) = &options.assoc_class {
                params.push(class_param("AssocClass", assoc_class));
            }
        }
        if let Some(result_class) = &options.result_class {
            params.push(class_param("ResultClass", result_class));
        }
        if let Some(role) = &options.role {
            params.push(string_param("Role", role));
        }
        if !is_reference_op {
            if let Some(result_role) = &options.result_role {
                params.push(string_param("ResultRole", result_role));
            }
        }
        params.push(bool_param(
            "IncludeClassOrigin",
            options.include_class_origin,
        ));
        params.push(uint32_param("MaxObjectCount", max_object_count));
        let result = self.imethod(operation, &ns, params, true)?;
        let handle = PullHandle::from_result(ns.clone(), &result)?;
        let instances = instances_of(result)?;
        Ok((with_namespace(instances, &ns), handle))
    }

    /// `PullInstancesWithPath`: the next batch for an open enumeration.
    ///
    /// A drained or closed handle fails client-side with
    /// `CIM_ERR_INVALID_ENUMERATION_CONTEXT`, matching what the server
    /// would return for its stale context.
    pub fn pull_instances_with_path(
        &self,
        handle: &mut PullHandle,
        max_object_count: u32,
    ) -> ClientResult<Vec<CimInstance>> {
        let context = handle.open_context()?;
        let params = vec![
            string_param("EnumerationContext", &context),
            uint32_param("MaxObjectCount", max_object_count),
        ];
        let result =
            self.imethod("PullInstancesWithPath", &handle.namespace, params, true)?;
        handle.advance(&result)?;
        let instances = instances_of(result)?;
        Ok(with_namespace(instances, handle.namespace()))
    }

    /// `PullInstancePaths`
    pub fn pull_instance_paths(
        &self,
        handle: &mut PullHandle,
        max_object_count: u32,
    ) -> ClientResult<Vec<CimInstanceName>> {
        let context = handle.open_context()?;
        let params = vec![
            string_param("EnumerationContext", &context),
            uint32_param("MaxObjectCount", max_object_count),
        ];
        let result = self.imethod("PullInstancePaths", &handle.namespace, params, true)?;
        handle.advance(&result)?;
        let namespace = handle.namespace().to_string();
        paths_of(result, &namespace)
    }

    /// `CloseEnumeration`: abandon an open enumeration early. Only the
    /// open state accepts it; afterwards the handle is drained.
    pub fn close_enumeration(&self, handle: &mut PullHandle) -> ClientResult<()> {
        let context = handle.open_context()?;
        let params = vec![string_param("EnumerationContext", &context)];
        self.imethod("CloseEnumeration", &handle.namespace, params, false)?;
        handle.context = None;
        handle.drained = true;
        Ok(())
    }
}

fn normalize(conn: &WbemConnection, namespace: Option<&str>) -> String {
    rwbem_types::normalize_namespace(
        namespace.unwrap_or(&conn.config().default_namespace),
    )
}

fn instances_of(result: IMethodResult) -> ClientResult<Vec<CimInstance>> {
    let mut out = Vec::with_capacity(result.return_items.len());
    for item in result.return_items {
        match item {
            CimXmlItem::Instance(i) => out.push(i),
            _ => {
                return Err(ClientError::Xml(CimXmlError::CimXmlParse {
                    element: "IRETURNVALUE".to_string(),
                    offset: 0,
                    reason: "expected instances in pull batch".to_string(),
                }))
            }
        }
    }
    Ok(out)
}

fn paths_of(result: IMethodResult, namespace: &str) -> ClientResult<Vec<CimInstanceName>> {
    let mut out = Vec::with_capacity(result.return_items.len());
    for item in result.return_items {
        match item {
            CimXmlItem::InstanceName(n) => out.push(if n.namespace.is_none() {
                n.with_namespace(namespace.to_string())
            } else {
                n
            }),
            _ => {
                return Err(ClientError::Xml(CimXmlError::CimXmlParse {
                    element: "IRETURNVALUE".to_string(),
                    offset: 0,
                    reason: "expected instance paths in pull batch".to_string(),
                }))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwbem_xml::IMethodResult;

    fn open_result(context: Option<&str>, eos: bool) -> IMethodResult {
        let mut result = IMethodResult::default();
        if let Some(ctx) = context {
            result.out_params.push((
                "EnumerationContext".to_string(),
                Some(CimValue::String(ctx.to_string())),
            ));
        }
        result
            .out_params
            .push(("EndOfSequence".to_string(), Some(CimValue::Boolean(eos))));
        result
    }

    #[test]
    fn open_state_holds_the_context() {
        let handle =
            PullHandle::from_result("root/cimv2".into(), &open_result(Some("ctx-1"), false))
                .unwrap();
        assert!(!handle.is_drained());
        assert_eq!(handle.open_context().unwrap(), "ctx-1");
    }

    #[test]
    fn end_of_sequence_drains_the_handle() {
        let handle =
            PullHandle::from_result("root/cimv2".into(), &open_result(Some("ctx-1"), true))
                .unwrap();
        assert!(handle.is_drained());
        let err = handle.open_context().unwrap_err();
        assert_eq!(
            err.cim_status(),
            Some(CimStatusCode::InvalidEnumerationContext)
        );
    }

    #[test]
    fn open_without_context_and_not_drained_is_an_error() {
        let err = PullHandle::from_result("root/cimv2".into(), &open_result(None, false))
            .unwrap_err();
        assert!(matches!(err, ClientError::Xml(_)));
    }

    #[test]
    fn advance_moves_open_to_drained_exactly_once() {
        let mut handle =
            PullHandle::from_result("root/cimv2".into(), &open_result(Some("ctx-1"), false))
                .unwrap();
        handle.advance(&open_result(Some("ctx-2"), false)).unwrap();
        assert_eq!(handle.open_context().unwrap(), "ctx-2");
        handle.advance(&open_result(None, true)).unwrap();
        assert!(handle.is_drained());
        assert!(handle.open_context().is_err());
    }
}
