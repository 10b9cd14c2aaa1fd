use std::fmt;
use std::num::NonZeroUsize;

macro_rules! uid {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
        pub struct $name(NonZeroUsize);

        impl $name {
            /// Position of the designated item in its program table.
            #[inline]
            pub fn idx(self) -> usize {
                self.0.get() - 1
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

uid!(
    /// Unique id to identify a class in the program
    ClassUid,
    "c"
);
uid!(
    /// Unique id to identify a method in the program
    MethodUid,
    "m"
);
uid!(
    /// Unique id to identify a field in the program
    FieldUid,
    "f"
);
uid!(
    /// Unique id to identify a method-local variable in the program
    VarUid,
    "v"
);
uid!(
    /// Unique id to identify a statement in the program
    StmtUid,
    "s"
);

#[derive(Debug, Default)]
pub struct ProgramCounters {
    nb_classes: usize,
    nb_methods: usize,
    nb_fields: usize,
    nb_vars: usize,
    nb_stmts: usize,
}

fn next(counter: &mut usize) -> NonZeroUsize {
    *counter += 1;
    NonZeroUsize::new(*counter).expect("just incremented, cannot be 0")
}

impl ProgramCounters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_class_uid(&mut self) -> ClassUid {
        ClassUid(next(&mut self.nb_classes))
    }

    pub(crate) fn new_method_uid(&mut self) -> MethodUid {
        MethodUid(next(&mut self.nb_methods))
    }

    pub(crate) fn new_field_uid(&mut self) -> FieldUid {
        FieldUid(next(&mut self.nb_fields))
    }

    pub(crate) fn new_var_uid(&mut self) -> VarUid {
        VarUid(next(&mut self.nb_vars))
    }

    pub(crate) fn new_stmt_uid(&mut self) -> StmtUid {
        StmtUid(next(&mut self.nb_stmts))
    }

    pub(crate) fn nb_classes(&self) -> usize {
        self.nb_classes
    }

    pub(crate) fn nb_methods(&self) -> usize {
        self.nb_methods
    }

    pub(crate) fn nb_fields(&self) -> usize {
        self.nb_fields
    }

    pub(crate) fn nb_vars(&self) -> usize {
        self.nb_vars
    }

    pub(crate) fn nb_stmts(&self) -> usize {
        self.nb_stmts
    }
}
