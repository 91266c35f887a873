use crate::html::{fill_template, html_output_path, script_json};
use crate::{DocumentError, DocumentResult, PageOptions, RenderContext, read_text};
use hoverplot_core::{
    AxisInfo, ContractBuilder, Error, PlotDataContract, Runtime, RuntimeOptions, TooltipArgs,
    discover_axes,
};
use std::path::{Path, PathBuf};

/// One static plot SVG on its way to an interactive HTML page.
///
/// Builder calls consume and return the plot, so configuration reads as a chain:
/// `InteractivePlot::from_svg(svg)?.add_tooltip(args)?.with_css(css)`.
#[derive(Debug, Clone)]
pub struct InteractivePlot {
    svg: String,
    axes: Vec<AxisInfo>,
    builder: ContractBuilder,
    additional_css: String,
    additional_javascript: String,
    options: RuntimeOptions,
}

impl InteractivePlot {
    /// Parses `svg` and discovers its axis containers.
    pub fn from_svg(svg: impl Into<String>) -> DocumentResult<Self> {
        let svg = svg.into();
        let axes = discover_axes(&svg)?;
        tracing::debug!(axes = axes.len(), "plot svg loaded");
        Ok(Self {
            svg,
            axes,
            builder: ContractBuilder::new(),
            additional_css: String::new(),
            additional_javascript: String::new(),
            options: RuntimeOptions::default(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> DocumentResult<Self> {
        Self::from_svg(read_text(path.as_ref())?)
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn axes(&self) -> &[AxisInfo] {
        &self.axes
    }

    /// Adds (or replaces) the tooltip of one axis. The axis' legend labels are appended to the
    /// entries so legend glyphs hover like data primitives.
    pub fn add_tooltip(mut self, args: TooltipArgs) -> DocumentResult<Self> {
        let position = args.axis.unwrap_or(0);
        let info = self
            .axes
            .iter()
            .find(|a| a.index == position + 1)
            .ok_or(Error::UnknownAxis {
                index: position,
                available: self.axes.len(),
            })?;
        let legend = info.legend_labels.clone();
        self.builder.add_tooltip(args, &legend)?;
        Ok(self)
    }

    /// Replaces every configured tooltip with a prebuilt contract.
    pub fn with_contract(mut self, contract: PlotDataContract) -> Self {
        self.builder = ContractBuilder::from(contract);
        self
    }

    /// Appends stylesheet text after the default stylesheet.
    pub fn with_css(mut self, css: impl AsRef<str>) -> Self {
        self.additional_css.push_str(css.as_ref());
        self
    }

    /// Appends a script that runs after the runtime is mounted.
    pub fn with_javascript(mut self, js: impl AsRef<str>) -> Self {
        self.additional_javascript.push_str(js.as_ref());
        self
    }

    pub fn with_options(mut self, options: RuntimeOptions) -> Self {
        self.options = options;
        self
    }

    /// The tooltip contract embedded in the page. Without any [`Self::add_tooltip`] call the
    /// first axis is configured with no labels.
    pub fn contract(&self) -> DocumentResult<PlotDataContract> {
        let Some(first) = self.axes.first() else {
            return Ok(self.builder.build());
        };
        if !self.builder.is_empty() {
            return Ok(self.builder.build());
        }
        let mut builder = self.builder.clone();
        builder.add_tooltip(TooltipArgs::new().axis(first.index - 1), &first.legend_labels)?;
        Ok(builder.build())
    }

    /// Mounts a headless runtime on this plot.
    pub fn runtime(&self) -> DocumentResult<Runtime> {
        Ok(Runtime::mount_contract(
            &self.svg,
            self.contract()?,
            self.options.clone(),
        )?)
    }

    /// Renders the complete HTML page.
    pub fn as_html(&self, ctx: &RenderContext, page: &PageOptions) -> DocumentResult<String> {
        let runtime = self.runtime()?;
        let svg = runtime.annotated_svg()?;

        let uuid = uuid::Uuid::new_v4().to_string();
        let plot_data_json = script_json(&runtime.contract().to_json());
        let favicon = page.favicon_link();
        fill_template(
            &ctx.template,
            &[
                ("uuid", uuid.as_str()),
                ("document_title", page.document_title.as_str()),
                ("favicon", favicon.as_str()),
                ("default_css", ctx.default_css.as_str()),
                ("additional_css", self.additional_css.as_str()),
                ("svg", svg.as_str()),
                ("plot_data_json", plot_data_json.as_str()),
                ("runtime_js", ctx.runtime_js.as_str()),
                ("additional_javascript", self.additional_javascript.as_str()),
            ],
        )
    }

    /// Writes the page to `path` (with `.html` appended when missing) and returns the path
    /// actually written.
    pub fn save(
        &self,
        ctx: &RenderContext,
        path: impl AsRef<Path>,
        page: &PageOptions,
    ) -> DocumentResult<PathBuf> {
        let html = self.as_html(ctx, page)?;
        let path = html_output_path(path);
        std::fs::write(&path, html).map_err(|source| DocumentError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "interactive plot saved");
        Ok(path)
    }
}
