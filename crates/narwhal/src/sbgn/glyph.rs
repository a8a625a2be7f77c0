//! SBGN glyph and arc vocabularies, read from node and edge kind tags.

use std::fmt;
use std::str::FromStr;

use narwhal_graph::{Edge, Node};

pub const MACROMOLECULE: &str = "macromolecule";
pub const UNIT_OF_INFORMATION: &str = "unit of information";
pub const STATE_VARIABLE: &str = "state variable";
pub const SOURCE_AND_SINK: &str = "source and sink";
pub const ASSOCIATION: &str = "association";
pub const DISSOCIATION: &str = "dissociation";
pub const OMITTED_PROCESS: &str = "omitted process";
pub const UNCERTAIN_PROCESS: &str = "uncertain process";
pub const SIMPLE_CHEMICAL: &str = "simple chemical";
pub const PROCESS: &str = "process";
pub const COMPLEX: &str = "complex";
pub const AND: &str = "and";
pub const OR: &str = "or";
pub const NOT: &str = "not";
pub const PHENOTYPE: &str = "phenotype";
pub const PERTURBING_AGENT: &str = "perturbing agent";
pub const TAG: &str = "tag";
pub const NUCLEIC_ACID_FEATURE: &str = "nucleic acid feature";
pub const UNSPECIFIED_ENTITY: &str = "unspecified entity";

/// Synthetic kinds created while the layout runs.
pub const DUMMY_COMPOUND: &str = "dummy compound";
pub const INPUT_PORT: &str = "input port";
pub const OUTPUT_PORT: &str = "output port";

pub const PRODUCTION: &str = "production";
pub const CONSUMPTION: &str = "consumption";
pub const INHIBITION: &str = "inhibition";
pub const CATALYSIS: &str = "catalysis";
pub const MODULATION: &str = "modulation";
pub const STIMULATION: &str = "stimulation";
pub const NECESSARY_STIMULATION: &str = "necessary stimulation";
pub const RIGID_EDGE: &str = "rigid edge";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    Macromolecule,
    UnitOfInformation,
    StateVariable,
    SourceAndSink,
    Association,
    Dissociation,
    OmittedProcess,
    UncertainProcess,
    SimpleChemical,
    Process,
    Complex,
    And,
    Or,
    Not,
    Phenotype,
    PerturbingAgent,
    Tag,
    NucleicAcidFeature,
    UnspecifiedEntity,
    DummyCompound,
    InputPort,
    OutputPort,
}

impl Glyph {
    pub fn as_str(self) -> &'static str {
        match self {
            Glyph::Macromolecule => MACROMOLECULE,
            Glyph::UnitOfInformation => UNIT_OF_INFORMATION,
            Glyph::StateVariable => STATE_VARIABLE,
            Glyph::SourceAndSink => SOURCE_AND_SINK,
            Glyph::Association => ASSOCIATION,
            Glyph::Dissociation => DISSOCIATION,
            Glyph::OmittedProcess => OMITTED_PROCESS,
            Glyph::UncertainProcess => UNCERTAIN_PROCESS,
            Glyph::SimpleChemical => SIMPLE_CHEMICAL,
            Glyph::Process => PROCESS,
            Glyph::Complex => COMPLEX,
            Glyph::And => AND,
            Glyph::Or => OR,
            Glyph::Not => NOT,
            Glyph::Phenotype => PHENOTYPE,
            Glyph::PerturbingAgent => PERTURBING_AGENT,
            Glyph::Tag => TAG,
            Glyph::NucleicAcidFeature => NUCLEIC_ACID_FEATURE,
            Glyph::UnspecifiedEntity => UNSPECIFIED_ENTITY,
            Glyph::DummyCompound => DUMMY_COMPOUND,
            Glyph::InputPort => INPUT_PORT,
            Glyph::OutputPort => OUTPUT_PORT,
        }
    }

    /// Glyph of a node, `None` for untagged or unknown kinds.
    pub fn of(node: &Node) -> Option<Self> {
        node.kind.as_deref().and_then(|k| k.parse().ok())
    }

    /// Reaction glyphs that get an input and an output port.
    pub fn is_process(self) -> bool {
        matches!(
            self,
            Glyph::Process
                | Glyph::OmittedProcess
                | Glyph::UncertainProcess
                | Glyph::Association
                | Glyph::Dissociation
        )
    }

    pub fn is_port(self) -> bool {
        matches!(self, Glyph::InputPort | Glyph::OutputPort)
    }
}

impl FromStr for Glyph {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            MACROMOLECULE => Glyph::Macromolecule,
            UNIT_OF_INFORMATION => Glyph::UnitOfInformation,
            STATE_VARIABLE => Glyph::StateVariable,
            SOURCE_AND_SINK => Glyph::SourceAndSink,
            ASSOCIATION => Glyph::Association,
            DISSOCIATION => Glyph::Dissociation,
            OMITTED_PROCESS => Glyph::OmittedProcess,
            UNCERTAIN_PROCESS => Glyph::UncertainProcess,
            SIMPLE_CHEMICAL => Glyph::SimpleChemical,
            PROCESS => Glyph::Process,
            COMPLEX => Glyph::Complex,
            AND => Glyph::And,
            OR => Glyph::Or,
            NOT => Glyph::Not,
            PHENOTYPE => Glyph::Phenotype,
            PERTURBING_AGENT => Glyph::PerturbingAgent,
            TAG => Glyph::Tag,
            NUCLEIC_ACID_FEATURE => Glyph::NucleicAcidFeature,
            UNSPECIFIED_ENTITY => Glyph::UnspecifiedEntity,
            DUMMY_COMPOUND => Glyph::DummyCompound,
            INPUT_PORT => Glyph::InputPort,
            OUTPUT_PORT => Glyph::OutputPort,
            other => return Err(UnknownKind(other.to_string())),
        })
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcClass {
    Production,
    Consumption,
    Inhibition,
    Catalysis,
    Modulation,
    Stimulation,
    NecessaryStimulation,
    Rigid,
}

impl ArcClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ArcClass::Production => PRODUCTION,
            ArcClass::Consumption => CONSUMPTION,
            ArcClass::Inhibition => INHIBITION,
            ArcClass::Catalysis => CATALYSIS,
            ArcClass::Modulation => MODULATION,
            ArcClass::Stimulation => STIMULATION,
            ArcClass::NecessaryStimulation => NECESSARY_STIMULATION,
            ArcClass::Rigid => RIGID_EDGE,
        }
    }

    pub fn of(edge: &Edge) -> Option<Self> {
        edge.kind.as_deref().and_then(|k| k.parse().ok())
    }

    /// Modulation family: arcs from an effector onto a process.
    pub fn is_effector(self) -> bool {
        matches!(
            self,
            ArcClass::Inhibition
                | ArcClass::Catalysis
                | ArcClass::Modulation
                | ArcClass::Stimulation
                | ArcClass::NecessaryStimulation
        )
    }
}

impl FromStr for ArcClass {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            PRODUCTION => ArcClass::Production,
            CONSUMPTION => ArcClass::Consumption,
            INHIBITION => ArcClass::Inhibition,
            CATALYSIS => ArcClass::Catalysis,
            MODULATION => ArcClass::Modulation,
            STIMULATION => ArcClass::Stimulation,
            NECESSARY_STIMULATION => ArcClass::NecessaryStimulation,
            RIGID_EDGE => ArcClass::Rigid,
            other => return Err(UnknownKind(other.to_string())),
        })
    }
}

impl fmt::Display for ArcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A kind tag outside the SBGN vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SBGN kind `{0}`")]
pub struct UnknownKind(pub String);

pub(crate) fn is_complex(node: &Node) -> bool {
    node.kind_is(COMPLEX)
}

pub(crate) fn is_port(node: &Node) -> bool {
    Glyph::of(node).is_some_and(Glyph::is_port)
}
