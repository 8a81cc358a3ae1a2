//! The generation driver: loads the script manifest, prepares the
//! configuration tree through the editor hooks, then executes each
//! generator item in merged manifest order.

use std::time::Instant;

use tracing::info;

use stencil_config::{ConfigEditor, ConfigTree, prepare_tree};
use stencil_core::{
    ContentType, DOCUMENT_EXTENSIONS, Error, ResourceKind, Result, parse_document,
};
use stencil_manifest::{GeneratorItem, LoadOptions, Manifest, load_script};

use crate::args::RunArgs;
use crate::reconcile::{OutputArtifact, Reconciler};
use crate::render::Renderer;
use crate::stats::Statistics;

fn editor_error(name: &str, cause: Box<Error>) -> Box<Error> {
    Box::new(Error::Editor {
        name: name.to_string(),
        message: cause.to_string(),
    })
}

/// Orchestrates one generation run against a loaded script manifest.
pub struct Pipeline {
    args: RunArgs,
    manifest: Manifest,
    renderer: Renderer,
}

impl Pipeline {
    /// Load and prepare the script manifest named by the run args.
    pub fn new(args: RunArgs) -> Result<Self> {
        let script = args
            .script
            .as_deref()
            .ok_or_else(|| Error::missing_value("script"))?;
        let manifest = load_script(
            script,
            &LoadOptions {
                locator: &args.locator,
                registries: &args.registries,
                parameters: &args.parameters,
            },
        )?;

        Ok(Self {
            args,
            manifest,
            renderer: Renderer::new(),
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Load the configuration named by the run args and prepare it.
    pub fn load_config(&self) -> Result<ConfigTree> {
        let name = self
            .args
            .config
            .as_deref()
            .ok_or_else(|| Error::missing_value("config"))?;
        let resource = self
            .args
            .locator
            .require(name, ResourceKind::Config, DOCUMENT_EXTENSIONS)?;
        self.load_config_content(&resource.content, &resource.name)
    }

    /// Load a configuration from in-memory content; `name` drives content
    /// type detection and error reporting.
    pub fn load_config_content(&self, content: &str, name: &str) -> Result<ConfigTree> {
        self.build_config(content, name)
            .map_err(|e| Error::invalid_config(name, e))
    }

    fn build_config(&self, content: &str, name: &str) -> Result<ConfigTree> {
        let content_type = ContentType::from_name(name).ok_or_else(|| {
            Box::new(Error::UnsupportedFormat {
                name: name.to_string(),
            })
        })?;
        let document = parse_document(content, content_type, name)?;
        let mut tree = ConfigTree::build(document, self.manifest.schema())?;

        // Seed the runtime parameters so editor hooks can read them; they
        // are reset and re-merged per generator item during the run.
        tree.params_mut().merge(self.manifest.parameters());

        // Instantiate each distinct registered editor once, first
        // occurrence winning on duplicates.
        let mut editors: Vec<(&str, Box<dyn ConfigEditor>)> = Vec::new();
        for editor_name in self.manifest.editors() {
            let editor_name = editor_name.as_str();
            if editors.iter().any(|(name, _)| *name == editor_name) {
                continue;
            }
            let editor = self.args.registries.editor(editor_name).ok_or_else(|| {
                Box::new(Error::EditorNotRegistered {
                    name: editor_name.to_string(),
                })
            })?;
            editors.push((editor_name, editor));
        }

        for (name, editor) in &editors {
            editor
                .before_prepare(&mut tree)
                .map_err(|e| editor_error(name, e))?;
        }

        prepare_tree(&mut tree)?;

        for (name, editor) in editors.iter().rev() {
            editor
                .after_prepare(&mut tree)
                .map_err(|e| editor_error(name, e))?;
        }

        Ok(tree)
    }

    /// Load the configuration and execute the whole run.
    pub fn generate(&self) -> Result<Statistics> {
        let mut tree = self.load_config()?;
        self.run(&mut tree)
    }

    /// Execute every generator item against a prepared configuration tree.
    pub fn run(&self, tree: &mut ConfigTree) -> Result<Statistics> {
        let reconciler = Reconciler::new(&self.args.output_dir)
            .simulation(self.args.simulation)
            .expect_no_changes(self.args.expect_no_changes);

        let run_started = Instant::now();
        let mut overall = Statistics::default();

        for item in self.manifest.generators() {
            let item_started = Instant::now();

            // Scope the runtime parameters to this item: the item's own
            // parameters first, the manifest's on top (later wins).
            let params = tree.params_mut();
            params.reset();
            params.merge(item.parameters());
            params.merge(self.manifest.parameters());

            info!(
                template = item.template(),
                text = item.text().unwrap_or_default(),
                "generating"
            );

            let mut stats = Statistics::default();
            self.run_item(item, tree, &mut |artifact| {
                reconciler.reconcile(&artifact, &mut stats).map(|_| ())
            })?;
            stats.elapsed = item_started.elapsed();
            info!("  {stats}");

            overall.absorb(&stats);
        }

        overall.elapsed = run_started.elapsed();
        Ok(overall)
    }

    /// Render one item's template for every node its generator selects,
    /// handing each artifact to the output callback.
    fn run_item(
        &self,
        item: &GeneratorItem,
        tree: &ConfigTree,
        on_output: &mut dyn FnMut(OutputArtifact) -> Result<()>,
    ) -> Result<()> {
        let template = item.template_resource(&self.args.locator)?;

        for node in item.generator().select(tree)? {
            let context = tree.render_context(node);
            let content = self.renderer.render(&template.name, &template.content, &context)?;
            let file_name = self.renderer.render(item.file(), item.file(), &context)?;
            let directory = item
                .directory()
                .map(|d| self.renderer.render(d, d, &context))
                .transpose()?;
            let gen_once_pattern = item
                .gen_once_pattern()
                .map(|p| self.renderer.render(p, p, &context))
                .transpose()?;

            on_output(OutputArtifact {
                directory,
                file_name,
                content,
                gen_once: item.is_gen_once(),
                gen_once_pattern,
            })?;
        }

        Ok(())
    }
}
