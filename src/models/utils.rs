use good_lp::{variable, ProblemVariables, Solution, Variable};

/// Bulk creation of decision variables over rectangular index sets. Each
/// tuple dimension becomes one level of `Vec` nesting, and every variable
/// gets an indexed name derived from `base_name`.
pub trait AddVars {
    type Out;

    /// Continuous non-negative variables
    fn cont(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out;

    /// Binary variables
    fn binary(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out;
}

impl AddVars for usize {
    type Out = Vec<Variable>;

    fn cont(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out {
        (0..*self)
            .map(|i| vars.add(variable().min(0.0).name(format!("{}_{}", base_name, i))))
            .collect()
    }

    fn binary(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out {
        (0..*self)
            .map(|i| vars.add(variable().binary().name(format!("{}_{}", base_name, i))))
            .collect()
    }
}

impl AddVars for (usize, usize) {
    type Out = Vec<<usize as AddVars>::Out>;

    fn cont(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out {
        (0..self.0)
            .map(|i| self.1.cont(vars, &format!("{}_{}", base_name, i)))
            .collect()
    }

    fn binary(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out {
        (0..self.0)
            .map(|i| self.1.binary(vars, &format!("{}_{}", base_name, i)))
            .collect()
    }
}

impl AddVars for (usize, usize, usize) {
    type Out = Vec<<(usize, usize) as AddVars>::Out>;

    fn cont(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out {
        (0..self.0)
            .map(|i| (self.1, self.2).cont(vars, &format!("{}_{}", base_name, i)))
            .collect()
    }

    fn binary(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out {
        (0..self.0)
            .map(|i| (self.1, self.2).binary(vars, &format!("{}_{}", base_name, i)))
            .collect()
    }
}

impl AddVars for (usize, usize, usize, usize) {
    type Out = Vec<<(usize, usize, usize) as AddVars>::Out>;

    fn cont(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out {
        (0..self.0)
            .map(|i| (self.1, self.2, self.3).cont(vars, &format!("{}_{}", base_name, i)))
            .collect()
    }

    fn binary(&self, vars: &mut ProblemVariables, base_name: &str) -> Self::Out {
        (0..self.0)
            .map(|i| (self.1, self.2, self.3).binary(vars, &format!("{}_{}", base_name, i)))
            .collect()
    }
}

/// Trait that reads solved variables back as `f64` tensors of the same shape.
pub trait ExtractValues {
    type Out;

    fn extract<S: Solution>(&self, solution: &S) -> Self::Out;
}

impl ExtractValues for Variable {
    type Out = f64;

    fn extract<S: Solution>(&self, solution: &S) -> Self::Out {
        solution.value(*self)
    }
}

impl<T: ExtractValues> ExtractValues for Vec<T> {
    type Out = Vec<T::Out>;

    fn extract<S: Solution>(&self, solution: &S) -> Self::Out {
        self.iter().map(|e| e.extract(solution)).collect()
    }
}
