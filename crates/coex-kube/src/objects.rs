//! Rendering of pod and service objects for one execution.

use serde_json::{Map, Value, json};

use coex_types::{ENV_EVENT_URL, ENV_EXECUTE_SEQ_ID, ENV_EXECUTE_TIMEOUT, ENV_INPUT, Env};

use crate::backend::ObjectKind;
use crate::error::{KubeError, Result};

pub fn pod_name(execution_id: i64) -> String {
    format!("co-pod-{execution_id}")
}

pub fn service_name(execution_id: i64) -> String {
    format!("co-svc-{execution_id}")
}

/// Name of a stored object, falling back to the canonical name.
pub fn object_name(kind: ObjectKind, execution_id: i64, object: &Value) -> String {
    object
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| match kind {
            ObjectKind::Pod => pod_name(execution_id),
            ObjectKind::Service => service_name(execution_id),
        })
}

/// Parameters injected into the component's templates.
#[derive(Debug, Clone)]
pub struct WorkloadSpec<'a> {
    pub execution_id: i64,
    pub namespace: &'a str,
    /// Image reference, `name[:tag]`.
    pub image: String,
    pub timeout: u64,
    pub input: &'a Value,
    /// Callback URL for lifecycle events.
    pub event_url: String,
    pub envs: &'a [Env],
}

impl WorkloadSpec<'_> {
    fn selector(&self) -> Value {
        json!({ ENV_EXECUTE_SEQ_ID: self.execution_id.to_string() })
    }

    fn container_env(&self) -> Result<Vec<Value>> {
        let input = serde_json::to_string(self.input)
            .map_err(|e| KubeError::Serialization(e.to_string()))?;
        let injected = [
            (ENV_EXECUTE_SEQ_ID, self.execution_id.to_string()),
            (ENV_EXECUTE_TIMEOUT, self.timeout.to_string()),
            (ENV_INPUT, input),
            (ENV_EVENT_URL, self.event_url.clone()),
        ];
        Ok(self
            .envs
            .iter()
            .map(|env| json!({ "name": env.key, "value": env.value }))
            .chain(
                injected
                    .into_iter()
                    .map(|(name, value)| json!({ "name": name, "value": value })),
            )
            .collect())
    }

    /// Render the pod from the component's pod template.
    pub fn render_pod(&self, template: &Value) -> Result<Value> {
        let mut pod = object_template(ObjectKind::Pod, template)?;
        set_metadata(&mut pod, &pod_name(self.execution_id), self.namespace);
        let labels = merge_object(&pod["metadata"]["labels"], self.selector());
        pod["metadata"]["labels"] = labels;

        let env = self.container_env()?;
        let spec = object_field(&mut pod, "spec")?;
        spec.insert("restartPolicy".into(), json!("OnFailure"));

        let containers = spec
            .entry("containers")
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(containers) = containers else {
            return Err(KubeError::InvalidTemplate(
                "pod spec.containers must be an array".into(),
            ));
        };
        if containers.is_empty() {
            containers.push(json!({}));
        }
        for (index, container) in containers.iter_mut().enumerate() {
            let Value::Object(container) = container else {
                return Err(KubeError::InvalidTemplate(format!(
                    "container {index} is not an object"
                )));
            };
            let name = format!("co-container-{}-{index}", self.execution_id);
            container.insert("name".into(), json!(name));
            container.insert("image".into(), json!(self.image));
            container.insert("imagePullPolicy".into(), json!("IfNotPresent"));

            let mut merged = match container.remove("env") {
                Some(Value::Array(existing)) => existing,
                _ => Vec::new(),
            };
            merged.extend(env.iter().cloned());
            container.insert("env".into(), Value::Array(merged));
        }
        Ok(pod)
    }

    /// Render the service from the component's service template.
    pub fn render_service(&self, template: &Value) -> Result<Value> {
        let mut service = object_template(ObjectKind::Service, template)?;
        set_metadata(&mut service, &service_name(self.execution_id), self.namespace);
        let spec = object_field(&mut service, "spec")?;
        spec.insert("selector".into(), self.selector());
        Ok(service)
    }
}

fn object_template(kind: ObjectKind, template: &Value) -> Result<Value> {
    let mut object = match template {
        Value::Object(_) => template.clone(),
        Value::Null => json!({}),
        _ => {
            return Err(KubeError::InvalidTemplate(format!(
                "{kind} template must be an object"
            )));
        }
    };
    object["apiVersion"] = json!("v1");
    object["kind"] = json!(match kind {
        ObjectKind::Pod => "Pod",
        ObjectKind::Service => "Service",
    });
    Ok(object)
}

fn set_metadata(object: &mut Value, name: &str, namespace: &str) {
    if !object["metadata"].is_object() {
        object["metadata"] = json!({});
    }
    object["metadata"]["name"] = json!(name);
    object["metadata"]["namespace"] = json!(namespace);
}

fn object_field<'a>(object: &'a mut Value, field: &str) -> Result<&'a mut Map<String, Value>> {
    if object[field].is_null() {
        object[field] = json!({});
    }
    object[field]
        .as_object_mut()
        .ok_or_else(|| KubeError::InvalidTemplate(format!("{field} must be an object")))
}

fn merge_object(existing: &Value, extra: Value) -> Value {
    let mut merged = existing.as_object().cloned().unwrap_or_default();
    if let Value::Object(extra) = extra {
        merged.extend(extra);
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec<'a>(input: &'a Value, envs: &'a [Env]) -> WorkloadSpec<'a> {
        WorkloadSpec {
            execution_id: 42,
            namespace: "team-a",
            image: "registry/echo:1.0".into(),
            timeout: 30,
            input,
            event_url: "http://coex:7300/v2/events".into(),
            envs,
        }
    }

    #[test]
    fn test_render_pod_injects_identity_and_env() {
        let input = json!({"n": 1});
        let envs = [Env::new("MODE", "batch")];
        let template = json!({
            "metadata": {"labels": {"app": "echo"}},
            "spec": {"containers": [{"command": ["echo"], "env": [{"name": "KEEP", "value": "1"}]}]}
        });

        let pod = spec(&input, &envs).render_pod(&template).unwrap();

        assert_eq!(pod["kind"], "Pod");
        assert_eq!(pod["metadata"]["name"], "co-pod-42");
        assert_eq!(pod["metadata"]["namespace"], "team-a");
        assert_eq!(pod["metadata"]["labels"]["app"], "echo");
        assert_eq!(pod["metadata"]["labels"]["CO_EXECUTE_SEQ_ID"], "42");
        assert_eq!(pod["spec"]["restartPolicy"], "OnFailure");

        let container = &pod["spec"]["containers"][0];
        assert_eq!(container["name"], "co-container-42-0");
        assert_eq!(container["image"], "registry/echo:1.0");
        assert_eq!(container["imagePullPolicy"], "IfNotPresent");
        assert_eq!(container["command"][0], "echo");

        let names: Vec<_> = container["env"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            ["KEEP", "MODE", "CO_EXECUTE_SEQ_ID", "CO_EXECUTE_TIMEOUT", "CO_INPUT", "CO_EVENT_URL"]
        );
        assert_eq!(container["env"][4]["value"], "{\"n\":1}");
        assert_eq!(container["env"][5]["value"], "http://coex:7300/v2/events");
    }

    #[test]
    fn test_render_pod_without_containers_adds_one() {
        let input = Value::Null;
        let pod = spec(&input, &[]).render_pod(&Value::Null).unwrap();
        let containers = pod["spec"]["containers"].as_array().unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0]["image"], "registry/echo:1.0");
    }

    #[test]
    fn test_render_service_selects_pod() {
        let input = Value::Null;
        let template = json!({"spec": {"ports": [{"port": 80}]}});
        let service = spec(&input, &[]).render_service(&template).unwrap();
        assert_eq!(service["kind"], "Service");
        assert_eq!(service["metadata"]["name"], "co-svc-42");
        assert_eq!(service["spec"]["selector"]["CO_EXECUTE_SEQ_ID"], "42");
        assert_eq!(service["spec"]["ports"][0]["port"], 80);
    }

    #[test]
    fn test_invalid_templates_rejected() {
        let input = Value::Null;
        let err = spec(&input, &[]).render_pod(&json!("pod")).unwrap_err();
        assert!(matches!(err, KubeError::InvalidTemplate(_)));

        let err = spec(&input, &[])
            .render_pod(&json!({"spec": {"containers": {}}}))
            .unwrap_err();
        assert!(matches!(err, KubeError::InvalidTemplate(_)));
    }

    #[test]
    fn test_object_name_fallback() {
        let stored = json!({"metadata": {"name": "custom"}});
        assert_eq!(object_name(ObjectKind::Pod, 3, &stored), "custom");
        assert_eq!(object_name(ObjectKind::Service, 3, &json!({})), "co-svc-3");
    }
}
