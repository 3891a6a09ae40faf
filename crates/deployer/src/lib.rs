//! The deployer loop: per-application create/update/restart decision plus
//! convergence polling, group-wide deploy, and recursive group deletion.

pub mod cli;

use model::{Application, Deployment, Error, GetAppResponse, JsonValue, ObservedApp, VersionResponse};
use orchestrator_client::{is_scale_only_update, is_update, Client, RawResponse};
use std::time::{Duration, Instant};

pub struct Deployer {
    client: Client,
    poll_timeout: Duration,
}

impl Deployer {
    pub fn new(client: Client, poll_timeout: Duration) -> Self {
        Self {
            client,
            poll_timeout,
        }
    }

    /// Creates, updates, or restarts a single application, then waits for
    /// it to converge.
    pub fn deploy(&self, application: &Application) -> Result<(), Error> {
        let id = application.id()?.to_string();
        tracing::debug!(%id, "deploying application");

        let version = match self.get_app(&id)? {
            None => {
                tracing::info!(%id, "application does not exist; creating");
                let resp = self.client.post("/v2/apps", &app_value(application))?;
                expect_status(&resp, &[200, 201])?;
                let VersionResponse { version } = parse(&resp)?;
                let expected_instances = application.instances().unwrap_or(1);

                self.wait_for_new_version(&id, &version)?;
                self.wait_for_instances(&id, &version, expected_instances, false)?;
                version
            }
            Some(current) => {
                let expected_instances = application
                    .instances()
                    .unwrap_or_else(|| coerce_i64(current.spec.get("instances")).unwrap_or(0));

                if is_update(application.as_value(), &current.spec) {
                    tracing::info!(%id, "application changed; updating");
                    let resp = self
                        .client
                        .put(&format!("/v2/apps/{id}"), &app_value(application), &[])?;
                    expect_status(&resp, &[200])?;
                    let VersionResponse { version } = parse(&resp)?;
                    let scale_only = is_scale_only_update(application.as_value(), &current.spec);

                    self.wait_for_new_version(&id, &version)?;
                    self.wait_for_instances(&id, &version, expected_instances, scale_only)?;
                    version
                } else {
                    tracing::info!(%id, "application unchanged; restarting");
                    let resp = self.client.post_empty(&format!("/v2/apps/{id}/restart"))?;
                    expect_status(&resp, &[200])?;
                    let VersionResponse { version } = parse(&resp)?;

                    self.wait_for_new_version(&id, &version)?;
                    self.wait_for_instances(&id, &version, expected_instances, false)?;
                    version
                }
            }
        };

        self.wait_while_affected_by_deployment(&id)?;
        tracing::info!(%id, %version, "deploy converged");
        Ok(())
    }

    /// Deploys every application in `document`. If `document` has no
    /// top-level `apps` array it's a single application itself; otherwise
    /// each app's id is rewritten to `<group.id>/<app's last path segment>`
    /// before deploying.
    pub fn deploy_group(&self, document: &JsonValue) -> Result<(), Error> {
        let obj = document
            .as_object()
            .ok_or_else(|| Error::Config("deployment document must be a JSON object".into()))?;

        let Some(apps) = obj.get("apps").and_then(JsonValue::as_array) else {
            return self.deploy(&Application::from_value(document.clone())?);
        };

        let group_id = obj
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::Config("group document is missing a string \"id\"".into()))?;

        for app_value in apps {
            let mut app = Application::from_value(app_value.clone())?;
            let rewritten = merge_group_and_app_id(group_id, app.id()?);
            app.set_id(rewritten);
            self.deploy(&app)?;
        }
        Ok(())
    }

    /// Empties and deletes `name` and every subgroup under it, deepest
    /// first, since the orchestrator refuses to delete a non-empty group.
    pub fn delete_group(&self, name: &str) -> Result<(), Error> {
        let resp = self.client.get(&format!("/v2/groups/{name}"))?;
        expect_status(&resp, &[200])?;

        let Some(root_groups) = resp.body.get("groups") else {
            return Err(Error::Http(format!(
                "no \"groups\" found in response for group {name}"
            )));
        };

        let mut groups_to_delete = vec![name.to_string()];
        let mut stack: Vec<&JsonValue> = vec![root_groups];
        while let Some(groups) = stack.pop() {
            let Some(groups) = groups.as_array() else {
                continue;
            };
            for group in groups {
                if let Some(nested) = group.get("groups") {
                    if let Some(id) = group.get("id").and_then(JsonValue::as_str) {
                        groups_to_delete.push(id.to_string());
                    }
                    stack.push(nested);
                }
            }
        }

        for group_id in groups_to_delete.into_iter().rev() {
            tracing::info!(%group_id, "emptying group before delete");
            let empty = serde_json::json!({"id": group_id, "apps": []});
            let resp = self.client.put("/v2/groups", &empty, &[("force", "true")])?;
            expect_status(&resp, &[200])?;

            tracing::info!(%group_id, "deleting group");
            let resp = self.client.delete(&format!("/v2/groups/{group_id}"))?;
            expect_status(&resp, &[200])?;
        }
        Ok(())
    }

    fn get_app(&self, id: &str) -> Result<Option<ObservedApp>, Error> {
        let resp = self.client.get(&format!("/v2/apps/{id}"))?;
        if resp.is_not_found() {
            return Ok(None);
        }
        expect_status(&resp, &[200])?;
        let GetAppResponse { app } = parse(&resp)?;
        Ok(Some(app))
    }

    fn wait_for_new_version(&self, id: &str, target_version: &str) -> Result<(), Error> {
        let start = Instant::now();
        loop {
            self.check_timeout(start, &format!("{id} to reach version {target_version}"))?;
            if let Some(current) = self.get_app(id)? {
                // RFC3339 timestamps are lexicographically orderable; do not
                // switch to a numeric compare.
                if current.version.as_str() >= target_version {
                    return Ok(());
                }
            }
            std::thread::sleep(Duration::from_secs(1));
        }
    }

    fn wait_for_instances(
        &self,
        id: &str,
        target_version: &str,
        expected_instances: i64,
        scale_only: bool,
    ) -> Result<(), Error> {
        let start = Instant::now();
        loop {
            self.check_timeout(start, &format!("{expected_instances} instance(s) of {id}"))?;

            let Some(current) = self.get_app(id)? else {
                std::thread::sleep(Duration::from_secs(1));
                continue;
            };

            if current.tasks.len() as i64 == expected_instances {
                let healthy_at_version = current
                    .tasks
                    .iter()
                    .filter(|task| {
                        let version_ok = scale_only || task.version.as_str() >= target_version;
                        task.app_id.starts_with(id)
                            && task.is_running()
                            && task.is_healthy()
                            && version_ok
                    })
                    .count() as i64;

                if healthy_at_version == expected_instances {
                    return Ok(());
                }
            }

            std::thread::sleep(Duration::from_secs(1));
        }
    }

    fn wait_while_affected_by_deployment(&self, id: &str) -> Result<(), Error> {
        let start = Instant::now();
        loop {
            self.check_timeout(start, &format!("deployments affecting {id} to clear"))?;
            let resp = self.client.get("/v2/deployments")?;
            expect_status(&resp, &[200])?;
            let deployments: Vec<Deployment> = parse(&resp)?;

            if !deployments
                .iter()
                .any(|d| d.affected_apps.iter().any(|app_id| app_id == id))
            {
                return Ok(());
            }
            std::thread::sleep(Duration::from_secs(1));
        }
    }

    fn check_timeout(&self, start: Instant, what: &str) -> Result<(), Error> {
        if start.elapsed() > self.poll_timeout {
            Err(Error::Http(format!(
                "timed out after {:?} waiting for {what}",
                self.poll_timeout
            )))
        } else {
            Ok(())
        }
    }
}

fn app_value(app: &Application) -> JsonValue {
    JsonValue::Object(app.as_value().clone())
}

fn expect_status(resp: &RawResponse, expected: &[u16]) -> Result<(), Error> {
    if expected.contains(&resp.status.as_u16()) {
        Ok(())
    } else {
        Err(Error::Http(format!(
            "unexpected status {} (body: {})",
            resp.status, resp.body
        )))
    }
}

fn parse<T: serde::de::DeserializeOwned>(resp: &RawResponse) -> Result<T, Error> {
    Ok(serde_json::from_value(resp.body.clone())?)
}

fn coerce_i64(value: Option<&JsonValue>) -> Option<i64> {
    match value? {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Concatenates `group_id` (ensured trailing `/`) with the last `/`-segment
/// of `app_id`.
fn merge_group_and_app_id(group_id: &str, app_id: &str) -> String {
    let mut out = group_id.to_string();
    if !out.ends_with('/') {
        out.push('/');
    }
    match app_id.rfind('/') {
        Some(idx) => out.push_str(&app_id[idx + 1..]),
        None => out.push_str(app_id),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_group_and_app_id() {
        assert_eq!(merge_group_and_app_id("parent", "/a/b/leaf"), "parent/leaf");
        assert_eq!(merge_group_and_app_id("parent/", "leaf"), "parent/leaf");
        assert_eq!(merge_group_and_app_id("parent", "leaf"), "parent/leaf");
    }
}
