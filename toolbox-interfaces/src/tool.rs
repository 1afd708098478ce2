//! The `Tool` interface (§4.3 ToolConfig/Tool, §4.5 invocation pipeline).

use async_trait::async_trait;
use serde_json::Value;

use toolbox_core::Result;
use toolbox_params::{Parameter, ParamValues};

use crate::capability::CapabilitySet;
use crate::source::Source;

/// A named, typed operation over exactly one source.
///
/// `Tool::invoke` is the single point every backend kind plugs into the shared
/// pipeline (§4.5): by the time it is called, parameters have already been
/// resolved, parsed, and template-expanded, and authorization has already
/// passed. The tool only has to run the backend-specific operation and return
/// raw results for the pipeline to normalize (§4.7).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name this tool was declared under in the config's `tools` map.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Standard (bind-lane) parameters, in declaration order.
    fn parameters(&self) -> &[Parameter];

    /// Template-lane parameters interpolated into backend-specific text (§4.3).
    fn template_parameters(&self) -> &[Parameter];

    /// Auth-service names every caller must have successfully verified against.
    fn auth_required(&self) -> &[String];

    /// Name of the source this tool was resolved against.
    fn source_name(&self) -> &str;

    /// Raw backend-specific text (SQL statement, request URL, command line)
    /// still carrying unexpanded `{{.name}}` placeholders for every declared
    /// template parameter (§4.3). Tool kinds with no template parameters
    /// return `None`; the pipeline then skips template expansion and passes
    /// `None` to `invoke`.
    fn template_text(&self) -> Option<&str> {
        None
    }

    /// Capabilities this tool requires its resolved source to publish (§4.6).
    fn required_capabilities(&self) -> &CapabilitySet;

    /// Run the backend-specific operation.
    ///
    /// `params` carries every resolved standard parameter in bind-lane form;
    /// `expanded_template` is the backend-specific text (SQL statement, request
    /// path, ...) with every template placeholder already substituted and
    /// whitelist-checked. Tool kinds that declare no template parameters ignore
    /// the second argument.
    async fn invoke(
        &self,
        source: &dyn Source,
        params: &ParamValues,
        expanded_template: Option<&str>,
    ) -> Result<Value>;
}
