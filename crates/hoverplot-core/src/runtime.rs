//! Mount/rebind bootstrapper tying contract, classifier and tooltip machine together.

use crate::annotate::annotate_svg;
use crate::classify::{Classification, ClassifiedElement, ClassifyOptions, ElementKey, classify};
use crate::contract::{GroupKey, PlotDataContract, axis_key};
use crate::tooltip::{
    ElementVisual, HoverTable, HoverTarget, PointerEvent, TooltipMachine, TooltipMetrics,
    TooltipState, Transition, Viewport,
};
use crate::Result;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    pub classify: ClassifyOptions,
    pub metrics: TooltipMetrics,
    /// When set, tooltip positions are clamped into this region.
    pub viewport: Option<Viewport>,
}

impl RuntimeOptions {
    pub fn strict() -> Self {
        Self {
            classify: ClassifyOptions::strict(),
            ..Self::default()
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }
}

/// Classified elements indexed for event handling. Rebuilt wholesale on every bind.
#[derive(Debug, Default)]
struct ElementTable {
    classification: Classification,
    contents: Vec<Option<String>>,
    by_group: FxHashMap<GroupKey, Vec<ElementKey>>,
    by_offset: FxHashMap<usize, ElementKey>,
}

impl ElementTable {
    fn build(classification: Classification, contract: &PlotDataContract) -> Self {
        let mut contents = Vec::with_capacity(classification.elements.len());
        let mut by_group: FxHashMap<GroupKey, Vec<ElementKey>> = FxHashMap::default();
        let mut by_offset = FxHashMap::default();

        for el in &classification.elements {
            let content = contract
                .axis(&axis_key(el.axis_index - 1))
                .and_then(|spec| spec.label_text(el.tooltip_index));
            contents.push(content);
            by_group.entry(el.group.clone()).or_default().push(el.key);
            by_offset.insert(el.node.range.start, el.key);
        }

        Self {
            classification,
            contents,
            by_group,
            by_offset,
        }
    }

    fn element(&self, key: ElementKey) -> Option<&ClassifiedElement> {
        self.classification
            .elements
            .get(key.0 as usize)
            .filter(|el| el.key == key)
    }
}

impl HoverTable for ElementTable {
    fn hover_target(&self, key: ElementKey) -> Option<HoverTarget<'_>> {
        let el = self.element(key)?;
        let content = self.contents.get(key.0 as usize).cloned().flatten();
        Some(HoverTarget {
            content,
            group: &el.group,
        })
    }

    fn group_members(&self, group: &GroupKey) -> &[ElementKey] {
        self.by_group.get(group).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// An interactive plot bound to one SVG document.
#[derive(Debug)]
pub struct Runtime {
    svg: String,
    contract: PlotDataContract,
    options: RuntimeOptions,
    table: ElementTable,
    machine: TooltipMachine,
    generation: u64,
}

impl Runtime {
    /// Parses the embedded contract and binds it to `svg`.
    pub fn mount(svg: &str, contract_json: &str, options: RuntimeOptions) -> Result<Self> {
        let contract = PlotDataContract::from_json(contract_json)?;
        Self::mount_contract(svg, contract, options)
    }

    pub fn mount_contract(
        svg: &str,
        contract: PlotDataContract,
        options: RuntimeOptions,
    ) -> Result<Self> {
        let machine = Self::fresh_machine(&contract, &options);
        let mut runtime = Self {
            svg: String::new(),
            contract,
            options,
            table: ElementTable::default(),
            machine,
            generation: 0,
        };
        runtime.rebind(svg)?;
        Ok(runtime)
    }

    /// Drops the current classification and tooltip state, then binds `svg`.
    ///
    /// On failure the runtime stays mounted with no classified elements.
    pub fn rebind(&mut self, svg: &str) -> Result<()> {
        self.table = ElementTable::default();
        self.machine = Self::fresh_machine(&self.contract, &self.options);
        self.svg = svg.to_string();
        self.generation += 1;

        let classification = classify(&self.svg, &self.contract, &self.options.classify)?;
        tracing::debug!(
            generation = self.generation,
            elements = classification.elements.len(),
            "runtime bound"
        );
        self.table = ElementTable::build(classification, &self.contract);
        Ok(())
    }

    fn fresh_machine(contract: &PlotDataContract, options: &RuntimeOptions) -> TooltipMachine {
        TooltipMachine::new(
            (contract.tooltip_x_shift, contract.tooltip_y_shift),
            options.metrics,
            options.viewport,
        )
    }

    /// Feeds one pointer event to the tooltip machine. Events on unknown elements are ignored.
    pub fn dispatch(&mut self, event: PointerEvent) -> Transition {
        let transition = self.machine.handle(&self.table, event);
        if transition == Transition::Ignored {
            tracing::trace!(target_key = %event.target(), "pointer event ignored");
        }
        transition
    }

    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.options.viewport = viewport;
        self.machine.set_viewport(viewport);
    }

    pub fn state(&self) -> &TooltipState {
        self.machine.state()
    }

    /// Visual state of an element; unknown keys are idle.
    pub fn visual(&self, key: ElementKey) -> ElementVisual {
        if self.table.element(key).is_none() {
            return ElementVisual::Idle;
        }
        self.machine.visual(key)
    }

    pub fn highlighted(&self) -> Vec<ElementKey> {
        self.elements()
            .iter()
            .map(|el| el.key)
            .filter(|key| self.machine.is_highlighted(*key))
            .collect()
    }

    pub fn elements(&self) -> &[ClassifiedElement] {
        &self.table.classification.elements
    }

    pub fn element(&self, key: ElementKey) -> Option<&ClassifiedElement> {
        self.table.element(key)
    }

    pub fn classification(&self) -> &Classification {
        &self.table.classification
    }

    /// Resolves an element by the byte offset of its start tag in the bound SVG.
    pub fn key_at_offset(&self, offset: usize) -> Option<ElementKey> {
        self.table.by_offset.get(&offset).copied()
    }

    /// Resolves an element by its SVG `id` attribute.
    pub fn key_for_id(&self, id: &str) -> Option<ElementKey> {
        self.elements()
            .iter()
            .find(|el| el.node.id.as_deref() == Some(id))
            .map(|el| el.key)
    }

    pub fn contract(&self) -> &PlotDataContract {
        &self.contract
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Number of successful or attempted binds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn annotated_svg(&self) -> Result<String> {
        annotate_svg(&self.svg, &self.table.classification)
    }
}
