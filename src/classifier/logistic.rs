//! L2 penalized binary logistic regression fitted by Newton iterations.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::classifier::BinaryClassifier;
use crate::error::BenchError;
use crate::tools::linalg::cholesky_solve;

/// regularization added to the intercept diagonal term of the hessian which is not penalized
const INTERCEPT_JITTER: f64 = 1.0e-10;

/// minimal step length in line search
const MIN_STEP: f64 = 1.0e-10;

/// Parameters of logistic regression.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct LogisticParams {
    /// inverse of regularization strength
    c: f64,
    /// maximum number of Newton iterations
    max_iter: usize,
    /// tolerance on the largest gradient component of the mean loss
    tol: f64,
    /// do we fit an intercept
    fit_intercept: bool,
} // end of LogisticParams

impl LogisticParams {
    /// c must be positive and finite, tol non negative
    pub fn new(c: f64, max_iter: usize, tol: f64, fit_intercept: bool) -> Result<Self, BenchError> {
        if !(c > 0.) || !c.is_finite() {
            log::error!("LogisticParams : inverse regularization must be positive, got {}", c);
            return Err(BenchError::InvalidTaskConfiguration(format!(
                "inverse regularization must be positive, got {}",
                c
            )));
        }
        if !(tol >= 0.) {
            return Err(BenchError::InvalidTaskConfiguration(format!(
                "tolerance must be non negative, got {}",
                tol
            )));
        }
        Ok(LogisticParams {
            c,
            max_iter,
            tol,
            fit_intercept,
        })
    }

    pub fn get_c(&self) -> f64 {
        self.c
    }

    pub fn get_max_iter(&self) -> usize {
        self.max_iter
    }

    pub fn get_tol(&self) -> f64 {
        self.tol
    }

    pub fn get_fit_intercept(&self) -> bool {
        self.fit_intercept
    }
} // end of impl LogisticParams

impl Default for LogisticParams {
    fn default() -> Self {
        LogisticParams {
            c: 1.,
            max_iter: 100,
            tol: 1.0e-4,
            fit_intercept: true,
        }
    }
}

/// numerically stable sigmoid
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0. {
        1. / (1. + (-z).exp())
    } else {
        let e = z.exp();
        e / (1. + e)
    }
}

// log(1 + exp(z)) without overflow
fn softplus(z: f64) -> f64 {
    z.max(0.) + (-z.abs()).exp().ln_1p()
}

#[cfg_attr(doc, katexit::katexit)]
/// Binary logistic regression.
///
/// With $w$ the weights and $b$ the intercept, fitting minimizes
/// $$ \frac{1}{2} \|w\|^2 + C \sum_i \log(1 + e^{z_i}) - y_i z_i  \quad z_i = w \cdot x_i + b $$
/// The intercept is not penalized. Minimization uses Newton steps with a backtracking line search,
/// the hessian system being solved by a Cholesky factorization. Iterations stop when
/// the largest component of the gradient divided by $C n$ is less than tol.
///
/// The solver is deterministic, it does not need a random generator.
/// Reaching max_iter before tol is not an error: a warning is logged and [is_converged](Self::is_converged) returns false.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogisticRegression {
    params: LogisticParams,
    /// weights, empty before fit
    coef: Vec<f64>,
    ///
    intercept: f64,
    /// number of Newton iterations done
    nb_iter: usize,
    ///
    converged: bool,
    ///
    fitted: bool,
} // end of LogisticRegression

impl LogisticRegression {
    pub fn new(params: LogisticParams) -> Self {
        LogisticRegression {
            params,
            coef: Vec::new(),
            intercept: 0.,
            nb_iter: 0,
            converged: false,
            fitted: false,
        }
    }

    pub fn get_params(&self) -> &LogisticParams {
        &self.params
    }

    pub fn get_coef(&self) -> &[f64] {
        &self.coef
    }

    pub fn get_intercept(&self) -> f64 {
        self.intercept
    }

    pub fn get_nb_iter(&self) -> usize {
        self.nb_iter
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    // objective at (w, b) given current z
    fn objective(&self, w: ArrayView1<f64>, z: &Array1<f64>, y: &Array1<f64>) -> f64 {
        let penalty = 0.5 * w.dot(&w);
        let loss: f64 = z.iter().zip(y.iter()).map(|(z, y)| softplus(*z) - y * z).sum();
        penalty + self.params.c * loss
    }

    // z = x w + b
    fn decision(x: &Array2<f64>, w: ArrayView1<f64>, b: f64) -> Array1<f64> {
        let mut z = x.dot(&w);
        z += b;
        z
    }

    fn check_fitted(&self, x: &Array2<f64>) -> Result<(), BenchError> {
        if !self.fitted {
            return Err(BenchError::Classifier("logistic regression used before fit".to_string()));
        }
        if x.ncols() != self.coef.len() {
            return Err(BenchError::DimensionMismatch {
                expected: self.coef.len(),
                got: x.ncols(),
            });
        }
        Ok(())
    }

    /// signed distance to the separating hyperplane
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>, BenchError> {
        self.check_fitted(x)?;
        Ok(Self::decision(x, ArrayView1::from(self.coef.as_slice()), self.intercept))
    }
} // end of impl LogisticRegression

impl BinaryClassifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), BenchError> {
        let (nb_rows, dim) = x.dim();
        if nb_rows == 0 || nb_rows != y.len() {
            log::error!("logistic fit with {} rows and {} labels", nb_rows, y.len());
            return Err(BenchError::Classifier(format!(
                "logistic fit with {} rows and {} labels",
                nb_rows,
                y.len()
            )));
        }
        let nb_pos = y.iter().filter(|l| **l == 1).count();
        if nb_pos == 0 || nb_pos == nb_rows {
            log::error!("logistic fit needs samples of 2 classes, got {} positive out of {}", nb_pos, nb_rows);
            return Err(BenchError::Classifier(
                "this solver needs samples of at least 2 classes in the data".to_string(),
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(BenchError::Classifier("non finite value in features".to_string()));
        }
        let y: Array1<f64> = y.mapv(|l| if l == 1 { 1. } else { 0. });
        let c = self.params.c;
        let fit_intercept = self.params.fit_intercept;
        let nb_params = if fit_intercept { dim + 1 } else { dim };
        // theta = (w, b)
        let mut theta = Array1::<f64>::zeros(nb_params);
        let intercept_of = |theta: &Array1<f64>| if fit_intercept { theta[dim] } else { 0. };
        let mut z = Self::decision(x, theta.slice(ndarray::s![..dim]), intercept_of(&theta));
        let mut obj = self.objective(theta.slice(ndarray::s![..dim]), &z, &y);
        //
        self.converged = false;
        self.nb_iter = 0;
        let scale = c * nb_rows as f64;
        for iter in 0..self.params.max_iter {
            let p = z.mapv(sigmoid);
            let residual = &p - &y;
            // gradient
            let mut grad = Array1::<f64>::zeros(nb_params);
            {
                let mut g_w = grad.slice_mut(ndarray::s![..dim]);
                g_w.assign(&(x.t().dot(&residual) * c));
                g_w += &theta.slice(ndarray::s![..dim]);
            }
            if fit_intercept {
                grad[dim] = c * residual.sum();
            }
            let grad_max = grad.iter().fold(0f64, |acc, g| acc.max(g.abs())) / scale;
            log::trace!("logistic iter {} objective {:.6e} gradient max {:.3e}", iter, obj, grad_max);
            if grad_max <= self.params.tol {
                self.converged = true;
                break;
            }
            // hessian
            let s = p.mapv(|p| p * (1. - p));
            let xs = x * &s.view().insert_axis(Axis(1));
            let mut hessian = Array2::<f64>::zeros((nb_params, nb_params));
            {
                let mut h_ww = hessian.slice_mut(ndarray::s![..dim, ..dim]);
                h_ww.assign(&(x.t().dot(&xs) * c));
                for j in 0..dim {
                    h_ww[[j, j]] += 1.;
                }
            }
            if fit_intercept {
                let h_wb = xs.sum_axis(Axis(0)) * c;
                for j in 0..dim {
                    hessian[[j, dim]] = h_wb[j];
                    hessian[[dim, j]] = h_wb[j];
                }
                hessian[[dim, dim]] = c * s.sum() + INTERCEPT_JITTER;
            }
            let direction = match cholesky_solve(&hessian, &grad) {
                Some(direction) => direction,
                None => {
                    log::error!("logistic fit : hessian not positive definite at iteration {}", iter);
                    return Err(BenchError::Classifier(
                        "hessian not positive definite, cannot do Newton step".to_string(),
                    ));
                }
            };
            // backtracking line search (Armijo)
            let slope = grad.dot(&direction);
            // near the optimum objective differences are at rounding level
            let rounding = 10. * f64::EPSILON * obj.abs().max(1.);
            let mut step = 1.;
            let (new_theta, new_z, new_obj) = loop {
                let candidate = &theta - &(&direction * step);
                let cand_z = Self::decision(
                    x,
                    candidate.slice(ndarray::s![..dim]),
                    intercept_of(&candidate),
                );
                let cand_obj = self.objective(candidate.slice(ndarray::s![..dim]), &cand_z, &y);
                if cand_obj <= obj - 1.0e-4 * step * slope + rounding || step < MIN_STEP {
                    break (candidate, cand_z, cand_obj);
                }
                step *= 0.5;
            };
            if !new_obj.is_finite() {
                return Err(BenchError::Classifier("non finite objective in logistic fit".to_string()));
            }
            let stalled = step < MIN_STEP;
            theta = new_theta;
            z = new_z;
            obj = new_obj;
            self.nb_iter = iter + 1;
            if stalled {
                log::debug!("logistic fit : line search stalled at iteration {}", iter);
                break;
            }
        } // end of Newton iterations
        if !self.converged {
            log::warn!(
                "logistic regression did not converge in {} iterations (max_iter {}), increase max_iter or scale data",
                self.nb_iter,
                self.params.max_iter
            );
        }
        self.coef = theta.slice(ndarray::s![..dim]).to_vec();
        self.intercept = intercept_of(&theta);
        self.fitted = true;
        log::debug!(
            "logistic fit done, nb_iter : {}, converged : {}, objective : {:.6e}",
            self.nb_iter,
            self.converged,
            obj
        );
        Ok(())
    } // end of fit

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, BenchError> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, BenchError> {
        Ok(self.decision_function(x)?.mapv(|z| if z > 0. { 1 } else { 0 }))
    }
} // end of impl BinaryClassifier for LogisticRegression

// end of mod tests
