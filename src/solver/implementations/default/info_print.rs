use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::timers::Timers;
use std::io::Write;
use std::time::Duration;

use super::*;

impl<T> ConfigurablePrintTarget for DefaultInfo<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

/// Problem dimensions reported in the configuration summary
pub(crate) struct ProblemSize {
    pub nvars: usize,
    pub ncons: usize,
    pub nfixed: usize,
    pub nstandard: usize,
    pub nrows: usize,
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub(crate) fn print_banner(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let out = &mut self.stream;

        writeln!(out, "-------------------------------------------------------------")?;
        writeln!(
            out,
            "     ipfilter v{}  -  interior point filter line search    ",
            crate::VERSION
        )?;
        writeln!(out, "-------------------------------------------------------------")?;
        Ok(())
    }

    pub(crate) fn print_configuration(
        &mut self,
        settings: &DefaultSettings<T>,
        size: &ProblemSize,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  variables     = {}", size.nvars)?;
        writeln!(out, "  constraints   = {}", size.ncons)?;
        if size.nfixed > 0 {
            writeln!(out, "  fixed         = {}", size.nfixed)?;
        }
        writeln!(
            out,
            "  standard form = {} variables, {} equalities",
            size.nstandard, size.nrows
        )?;
        writeln!(out)?;

        self.print_settings(settings)?;

        Ok(())
    }

    pub(crate) fn print_status_header(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        //print a subheader for the iterations info
        write!(out, "iter    ")?;
        write!(out, "objective    ")?;
        write!(out, "inf_pr    ")?;
        write!(out, "inf_du    ")?;
        write!(out, "lg(mu) ")?;
        write!(out, "lg(δw) ")?;
        write!(out, "α_du      ")?;
        write!(out, "α_pr     ")?;
        write!(out, "ls")?;
        writeln!(out,)?;
        writeln!(
            out,
            "-------------------------------------------------------------------------------------"
        )?;
        out.flush()?;
        Ok(())
    }

    pub(crate) fn print_status(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        let marker = if self.restored { "r" } else { " " };
        write!(out, "{:>4}{} ", self.iterations, marker)?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.objective))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_primal))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_dual))?;
        write!(out, "{}  ", _log10_str(self.μ))?;
        write!(out, "{}  ", _log10_str(self.δw))?;

        if self.iterations > 0 {
            write!(out, "{}  ", expformat!("{:6.2e}", self.α_du))?;
            write!(out, "{}  ", expformat!("{:6.2e}", self.α_pr))?;
            let soc = if self.soc { "s" } else { "" };
            write!(out, "{}{}", self.ls_trials, soc)?;
        } else {
            write!(out, " ------    ------    -")?;
        }

        writeln!(out,)?;

        Ok(())
    }

    pub(crate) fn print_footer(&mut self, settings: &DefaultSettings<T>, timers: &Timers) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        writeln!(
            out,
            "-------------------------------------------------------------------------------------"
        )?;

        writeln!(out, "Terminated with status = {}", self.status)?;
        writeln!(out, "restorations = {}", self.restorations)?;
        writeln!(out, "solve time = {:?}", Duration::from_secs_f64(self.solve_time))?;
        timers.print(out)?;
        out.flush()?;

        Ok(())
    }

    fn print_settings(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        let out = &mut self.stream;

        let set = settings;

        writeln!(out, "settings:")?;
        writeln!(
            out,
            "  linear algebra: direct / qdldl, precision: {} bit",
            _get_precision_string::<T>()
        )?;

        let time_lim_str = {
            if set.time_limit.is_infinite() {
                "Inf".to_string()
            } else {
                format!("{:?}", set.time_limit)
            }
        };
        writeln!(
            out,
            "  max iter = {}, time limit = {}",
            set.max_iter, time_lim_str
        )?;

        writeln!(
            out,
            "  eps = {:.1e}, tol = {:.1e}, μ₀ = {:.1e}, κμ = {:.2}, θμ = {:.2}",
            set.eps, set.tol, set.mu_init, set.kappa_mu, set.theta_mu
        )?;

        writeln!(
            out,
            "  inertia    : δw₀ = {:.1e}, δw ∈ [{:.1e}, {:.1e}], δc = {:.1e}·μ^{:.2}",
            set.delta_w_init, set.delta_w_min, set.delta_w_max, set.delta_c_bar, set.kappa_c
        )?;

        writeln!(
            out,
            "  iter refine: {}, reltol = {:.1e}, abstol = {:.1e},",
            _bool_on_off(set.iterative_refinement_enable),
            set.iterative_refinement_reltol,
            set.iterative_refinement_abstol
        )?;

        writeln!(
            out,
            "               max iter = {}, stop ratio = {:.1}",
            set.iterative_refinement_max_iter, set.iterative_refinement_stop_ratio
        )?;

        writeln!(
            out,
            "  filter     : γθ = {:.1e}, γφ = {:.1e}, soc max = {}",
            set.gamma_theta, set.gamma_phi, set.soc_max
        )?;

        writeln!(
            out,
            "  restoration: max = {}, ρ = {:.1e}, max iter = {}",
            set.max_restorations, set.restoration_rho, set.restoration_max_iter
        )?;

        writeln!(out,)?;

        Ok(())
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

fn _log10_str<T: FloatT>(v: T) -> String {
    if v > T::zero() {
        format!("{:>5.1}", v.log10())
    } else {
        "    -".to_string()
    }
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.

fn _exp_str_reformat(mut thestr: String) -> String {
    let eidx = match thestr.find('e') {
        Some(idx) => idx,
        None => return thestr,
    };
    let has_sign = thestr[eidx + 1..].starts_with('-');

    let has_short_exp = {
        if !has_sign {
            thestr.len() == eidx + 2
        } else {
            thestr.len() == eidx + 3
        }
    };

    let chars = match (has_sign, has_short_exp) {
        (false, true) => "+0",
        (false, false) => "+",
        (true, true) => "0",
        (true, false) => "",
    };

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat("1.5e3".to_string()), "1.5e+03");
    assert_eq!(_exp_str_reformat("1.5e-3".to_string()), "1.5e-03");
    assert_eq!(_exp_str_reformat("1.5e-13".to_string()), "1.5e-13");
    assert_eq!(_exp_str_reformat("1.5e13".to_string()), "1.5e+13");
    assert_eq!(_log10_str(100.), "  2.0");
    assert_eq!(_log10_str(0.), "    -");
}
