#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;

// Verbose progress printing for the outer loop.  All output is gated on
// settings.verbose.

impl<T: FloatT> DefaultInfo<T> {
    pub(crate) fn print_configuration(
        &self,
        settings: &DefaultSettings<T>,
        prob: &Problem<T>,
        constrained: bool,
    ) {
        if !settings.verbose {
            return;
        }

        println!("\nproblem:");
        println!("  states        = {}", prob.nx);
        println!("  controls      = {}", prob.nu);
        println!("  knot points   = {}", prob.horizon);
        println!("  scheme        = {:?}", prob.scheme);
        println!("  constrained   = {}", constrained);
        if prob.is_min_time() {
            println!("  minimum time  = true");
        }
        if prob.infeasible {
            println!("  infeasible start = true");
        }

        println!("settings:");
        println!(
            "  outer iter limit = {}, inner iter limit = {}",
            settings.max_outer_iter, settings.max_inner_iter
        );
        println!(
            "  constraint tol = {:.2e}, cost tol = {:.2e}",
            settings.constraint_tolerance, settings.cost_tolerance
        );
        println!(
            "  penalty scaling = {:.2e}, penalty max = {:.2e}",
            settings.penalty_scaling, settings.penalty_max
        );
        println!();
    }

    pub(crate) fn print_status_header(&self, settings: &DefaultSettings<T>) {
        if !settings.verbose {
            return;
        }
        println!("iter    cost         ‖c‖          inner");
        println!("-----------------------------------------");
    }

    pub(crate) fn print_status(&self, settings: &DefaultSettings<T>) {
        if !settings.verbose {
            return;
        }
        let i = self.iterations as usize;
        if i == 0 {
            return;
        }
        println!(
            "{:<4}  {:>11.4e}  {:>11.4e}  {:>5}",
            i,
            self.cost_history[i - 1],
            self.violation_history[i - 1],
            self.iter_inner_history[i - 1]
        );
    }

    pub(crate) fn print_footer(&self, settings: &DefaultSettings<T>) {
        if !settings.verbose {
            return;
        }
        println!("-----------------------------------------");
        println!("status    = {}", self.status);
        println!(
            "iterations = {} outer / {} inner",
            self.iterations, self.iterations_inner
        );
        println!("solve time = {:.3e}s", self.solve_time);
    }
}
