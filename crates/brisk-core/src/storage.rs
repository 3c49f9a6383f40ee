use crate::config::UndefinedUsePolicy;
use crate::types::Type;
use cranelift_codegen::ir::{StackSlot, StackSlotData, StackSlotKind};
use cranelift_frontend::FunctionBuilder;
use indexmap::IndexMap;
use tracing::{trace, warn};

/// The stack slot backing one variable, sized to the type it was first defined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageCell {
    pub slot: StackSlot,
    pub ty: Type,
}

/// How a name is being touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Written with a value of this width.
    Define(Type),
    /// Read.
    Use,
}

/// Per-function mapping from variable names to storage cells.
///
/// Cells are allocated on first access and never freed or replaced; a redefinition writes
/// through the cell that already exists.
#[derive(Debug, Default)]
pub struct StorageTable {
    cells: IndexMap<String, StorageCell>,
    policy: UndefinedUsePolicy,
}

impl StorageTable {
    pub fn new(policy: UndefinedUsePolicy) -> Self {
        Self {
            cells: IndexMap::new(),
            policy,
        }
    }

    pub fn get(&self, name: &str) -> Option<StorageCell> {
        self.cells.get(name).copied()
    }

    /// Returns the cell for `name`, allocating it if this is the first access.
    ///
    /// A first access that is a use allocates a boolean-width cell under
    /// `UndefinedUsePolicy::DefaultBool` and returns `None` under `Reject`.
    pub fn get_or_create(
        &mut self,
        name: &str,
        access: Access,
        builder: &mut FunctionBuilder,
    ) -> Option<StorageCell> {
        if let Some(cell) = self.cells.get(name) {
            return Some(*cell);
        }

        let ty = match (access, self.policy) {
            (Access::Define(ty), _) => ty,
            (Access::Use, UndefinedUsePolicy::DefaultBool) => {
                warn!(variable = name, "use before definition, allocating a bool cell");
                Type::Bool
            }
            (Access::Use, UndefinedUsePolicy::Reject) => return None,
        };

        let slot = builder.create_sized_stack_slot(StackSlotData::new(
            StackSlotKind::ExplicitSlot,
            ty.size_bytes(),
            ty.align_shift(),
        ));
        let cell = StorageCell { slot, ty };
        trace!(variable = name, %ty, ?slot, "allocated storage cell");
        self.cells.insert(name.to_string(), cell);
        Some(cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, StorageCell)> {
        self.cells.iter().map(|(name, cell)| (name.as_str(), *cell))
    }

    pub fn into_cells(self) -> Vec<(String, StorageCell)> {
        self.cells.into_iter().collect()
    }
}
